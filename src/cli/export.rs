use std::path::PathBuf;

use crate::aggregator::{
    build_dashboard, quarter_label, Dashboard, FoodCostSummary, LabourSummary, SalesSummary,
};
use crate::error::Result;
use crate::html::render_page;
use crate::objectives::{score, Scorecard};
use crate::settings::get_data_dir;
use crate::store::{load_kpis, load_snapshot};

fn default_path(extension: &str) -> String {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    get_data_dir()
        .join("exports")
        .join(format!("dashboard-{date}.{extension}"))
        .to_string_lossy()
        .into_owned()
}

fn load_dashboard(restaurant: Option<&str>) -> Result<(Dashboard, Scorecard, String)> {
    let data_dir = get_data_dir();
    let snapshot = load_snapshot(&data_dir)?;
    let kpis = load_kpis(&data_dir);
    let dashboard = build_dashboard(&snapshot, &kpis, restaurant);
    let scorecard = score(&dashboard.quarter);
    let quarter = quarter_label(snapshot.start);
    Ok((dashboard, scorecard, quarter))
}

fn write_output(path: Option<String>, extension: &str, content: &[u8]) -> Result<PathBuf> {
    let path = PathBuf::from(path.unwrap_or_else(|| default_path(extension)));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    Ok(path)
}

pub fn html(restaurant: Option<String>, output: Option<String>) -> Result<()> {
    let (dashboard, scorecard, _) = load_dashboard(restaurant.as_deref())?;
    let page = render_page(
        &dashboard,
        &scorecard,
        restaurant.as_deref().unwrap_or("Tous"),
    );
    let path = write_output(output, "html", page.as_bytes())?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_row(
    writer: &mut csv::Writer<Vec<u8>>,
    label: &str,
    sales: &SalesSummary,
    food: &FoodCostSummary,
    labour: &LabourSummary,
    fcfp: f64,
    numerique: f64,
) -> Result<()> {
    writer.write_record([
        label.to_string(),
        format!("{:.2}", sales.actual),
        format!("{:.2}", sales.prior_year),
        format!("{:.2}", sales.growth_pct),
        format!("{:.2}", food.raw_waste),
        format!("{:.2}", food.completed_waste),
        format!("{:.2}", food.condiments),
        format!("{:.2}", food.employee_meals),
        format!("{:.2}", food.stat),
        format!("{:.2}", food.total),
        format!("{:.2}", food.pct_of_sales),
        format!("{:.2}", labour.crew),
        format!("{:.2}", labour.management),
        format!("{:.2}", labour.total),
        format!("{:.2}", labour.pct_of_sales),
        format!("{:.0}", fcfp),
        format!("{:.2}", numerique),
    ])?;
    Ok(())
}

pub fn csv(restaurant: Option<String>, output: Option<String>) -> Result<()> {
    let (dashboard, _, quarter) = load_dashboard(restaurant.as_deref())?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "mois",
        "ventes",
        "annee_precedente",
        "croissance_pct",
        "perte_brute",
        "perte_completee",
        "condiments",
        "aliments_employes",
        "stat",
        "cout_aliments_total",
        "cout_aliments_pct",
        "equipiers",
        "gestion",
        "main_oeuvre_total",
        "main_oeuvre_pct",
        "fcfp",
        "numerique_pct",
    ])?;

    for m in &dashboard.months {
        write_row(&mut writer, &m.month, &m.sales, &m.food_cost, &m.labour, m.fcfp, m.numerique)?;
    }
    let q = &dashboard.quarter;
    write_row(&mut writer, &quarter, &q.sales, &q.food_cost, &q.labour, q.fcfp, q.numerique)?;

    let data = writer
        .into_inner()
        .map_err(|e| crate::error::ObjectifError::Other(e.to_string()))?;
    let path = write_output(output, "csv", &data)?;
    println!("Wrote {}", path.display());
    Ok(())
}
