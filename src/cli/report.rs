use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aggregator::{build_dashboard, pct_of, quarter_label, Dashboard};
use crate::categorizer::FoodCostCategory;
use crate::error::Result;
use crate::fmt::{money0, month_label, pct, pct1};
use crate::objectives::{score, Scorecard, OBJECTIVES};
use crate::settings::get_data_dir;
use crate::store::{load_kpis, load_snapshot};

fn delta_cell(value: f64, formatted: String) -> Cell {
    if value < 0.0 {
        Cell::new(formatted.red())
    } else {
        Cell::new(formatted.green())
    }
}

fn points(achieved: u32, maximum: u32) -> String {
    format!("{achieved}/{maximum}")
}

/// Terminal rendition of the quarterly results sheet.
pub fn format_dashboard(dashboard: &Dashboard, scorecard: &Scorecard, quarter: &str) -> String {
    let months = &dashboard.months;
    let q = &dashboard.quarter;
    let objectives = &OBJECTIVES;
    let blank = months.len() + 5;

    let mut table = Table::new();
    let mut header = vec!["Critères".to_string()];
    header.extend(months.iter().map(|m| month_label(&m.month)));
    header.push(format!("{quarter} ($)"));
    header.push(format!("{quarter} (%)"));
    header.push("Objectif".to_string());
    header.push("Différence".to_string());
    header.push("Points".to_string());
    table.set_header(header);

    let section = |table: &mut Table, label: &str| {
        let mut row = vec![Cell::new(label.yellow().bold())];
        row.extend((0..blank).map(|_| Cell::new("")));
        table.add_row(row);
    };

    // — Ventes —
    section(&mut table, "VENTES");
    let year = months
        .first()
        .and_then(|m| m.month.split('-').next())
        .unwrap_or("Actuel")
        .to_string();

    let mut row = vec![Cell::new(format!("  {year}"))];
    row.extend(months.iter().map(|m| Cell::new(money0(m.sales.actual))));
    row.push(Cell::new(money0(q.sales.actual)));
    row.extend([Cell::new(""), Cell::new(""), Cell::new(""), Cell::new("")]);
    table.add_row(row);

    let mut row = vec![Cell::new("  Année précédente")];
    row.extend(months.iter().map(|m| Cell::new(money0(m.sales.prior_year))));
    row.push(Cell::new(money0(q.sales.prior_year)));
    row.extend([Cell::new(""), Cell::new(""), Cell::new(""), Cell::new("")]);
    table.add_row(row);

    let mut row = vec![Cell::new("  Croissance")];
    row.extend(
        months
            .iter()
            .map(|m| delta_cell(m.sales.growth_pct, pct(m.sales.growth_pct))),
    );
    row.push(Cell::new(""));
    row.push(delta_cell(q.sales.growth_pct, pct(q.sales.growth_pct)));
    row.push(Cell::new(pct1(objectives.sales_growth_pct)));
    row.push(delta_cell(scorecard.sales.difference, pct1(scorecard.sales.difference)));
    row.push(Cell::new(points(scorecard.sales.achieved, scorecard.sales.maximum)));
    table.add_row(row);

    // — Coût des aliments —
    section(&mut table, "COÛT DES ALIMENTS");
    for category in FoodCostCategory::ALL {
        let mut row = vec![Cell::new(format!("  {}", category.label()))];
        row.extend(
            months
                .iter()
                .map(|m| Cell::new(money0(m.food_cost.amount(category)))),
        );
        let quarterly = q.food_cost.amount(category);
        row.push(Cell::new(money0(quarterly)));
        row.push(Cell::new(pct(pct_of(quarterly, q.sales.actual))));
        row.push(Cell::new(pct(category.objective_pct())));
        row.extend([Cell::new(""), Cell::new("")]);
        table.add_row(row);
    }

    let mut row = vec![Cell::new("  Total ($)".bold())];
    row.extend(months.iter().map(|m| Cell::new(money0(m.food_cost.total))));
    row.push(Cell::new(money0(q.food_cost.total)));
    row.push(Cell::new(""));
    row.push(Cell::new(money0(objectives.food_cost_amount)));
    row.extend([Cell::new(""), Cell::new("")]);
    table.add_row(row);

    let mut row = vec![Cell::new("  Total (%)".bold())];
    row.extend(
        months
            .iter()
            .map(|m| Cell::new(pct(m.food_cost.pct_of_sales))),
    );
    row.push(Cell::new(""));
    row.push(Cell::new(pct(q.food_cost.pct_of_sales)));
    row.push(Cell::new(pct(objectives.food_cost_pct)));
    row.push(delta_cell(
        scorecard.food_cost.difference,
        pct(scorecard.food_cost.difference),
    ));
    row.push(Cell::new(points(
        scorecard.food_cost.achieved,
        scorecard.food_cost.maximum,
    )));
    table.add_row(row);

    // — Main d'oeuvre —
    section(&mut table, "MAIN D'OEUVRE");
    let mut plain_row = |label: &str, monthly: Vec<String>, quarterly: String| {
        let mut row = vec![Cell::new(label)];
        row.extend(monthly.into_iter().map(Cell::new));
        row.push(Cell::new(quarterly));
        row.extend([Cell::new(""), Cell::new(""), Cell::new(""), Cell::new("")]);
        table.add_row(row);
    };
    plain_row(
        "  M-O Équipiers, CdQ ($)",
        months.iter().map(|m| money0(m.labour.crew)).collect(),
        money0(q.labour.crew),
    );
    plain_row(
        "  M-O Équipiers, CdQ (%)",
        months.iter().map(|m| pct1(m.labour.crew_pct)).collect(),
        pct1(q.labour.crew_pct),
    );
    plain_row(
        "  Gestion ($)",
        months.iter().map(|m| money0(m.labour.management)).collect(),
        money0(q.labour.management),
    );
    plain_row(
        "  Gestion (%)",
        months.iter().map(|m| pct1(m.labour.management_pct)).collect(),
        pct1(q.labour.management_pct),
    );

    let mut row = vec![Cell::new("  Total ($)".bold())];
    row.extend(months.iter().map(|m| Cell::new(money0(m.labour.total))));
    row.push(Cell::new(money0(q.labour.total)));
    row.push(Cell::new(""));
    row.push(Cell::new(money0(objectives.labour_amount)));
    row.extend([Cell::new(""), Cell::new("")]);
    table.add_row(row);

    let mut row = vec![Cell::new("  Total (%)".bold())];
    row.extend(months.iter().map(|m| Cell::new(pct1(m.labour.pct_of_sales))));
    row.push(Cell::new(""));
    row.push(Cell::new(pct1(q.labour.pct_of_sales)));
    row.push(Cell::new(pct1(objectives.labour_pct)));
    row.push(delta_cell(scorecard.labour.difference, pct1(scorecard.labour.difference)));
    row.push(Cell::new(points(scorecard.labour.achieved, scorecard.labour.maximum)));
    table.add_row(row);

    // — KPIs —
    let mut row = vec![Cell::new("FCFP".yellow().bold())];
    row.extend(months.iter().map(|m| Cell::new(format!("{:.0}", m.fcfp))));
    row.push(Cell::new(format!("{:.0}", q.fcfp)));
    row.push(Cell::new(""));
    row.push(Cell::new(format!("{:.0}", objectives.fcfp)));
    row.push(delta_cell(
        scorecard.fcfp.difference,
        format!("{:.0}", scorecard.fcfp.difference),
    ));
    row.push(Cell::new(points(scorecard.fcfp.achieved, scorecard.fcfp.maximum)));
    table.add_row(row);

    let mut row = vec![Cell::new("Numérique".yellow().bold())];
    row.extend(months.iter().map(|m| Cell::new(pct1(m.numerique))));
    row.push(Cell::new(""));
    row.push(Cell::new(pct(q.numerique)));
    row.push(Cell::new(pct1(objectives.numerique_pct)));
    row.push(delta_cell(
        scorecard.numerique.difference,
        pct(scorecard.numerique.difference),
    ));
    row.push(Cell::new(points(
        scorecard.numerique.achieved,
        scorecard.numerique.maximum,
    )));
    table.add_row(row);

    table.to_string()
}

pub fn run(restaurant: Option<String>) -> Result<()> {
    let data_dir = get_data_dir();
    let snapshot = load_snapshot(&data_dir)?;
    let kpis = load_kpis(&data_dir);
    let dashboard = build_dashboard(&snapshot, &kpis, restaurant.as_deref());
    let scorecard = score(&dashboard.quarter);
    let quarter = quarter_label(snapshot.start);

    println!(
        "{}",
        format!("Résultats {}", restaurant.as_deref().unwrap_or("Tous")).bold()
    );
    println!("Période: {} au {}", snapshot.start, snapshot.end);
    println!();
    println!("{}", format_dashboard(&dashboard, &scorecard, &quarter));
    println!();

    let note = format!(
        "Note atteinte: {} ({}/{} points)",
        pct1(scorecard.note_pct()),
        scorecard.total_achieved(),
        scorecard.total_maximum()
    );
    if scorecard.note_pct() >= 50.0 {
        println!("{}", note.green().bold());
    } else {
        println!("{}", note.red().bold());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KpiStore, LineSource, Snapshot, TxnLine};
    use chrono::NaiveDate;

    fn dashboard() -> (Dashboard, Scorecard) {
        let snapshot = Snapshot {
            fetched_at: String::new(),
            start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            lines: vec![
                TxnLine {
                    date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
                    amount: 480_000.0,
                    account_number: "40100".to_string(),
                    account_name: "Ventes".to_string(),
                    source: LineSource::JournalEntry,
                    entity: None,
                },
                TxnLine {
                    date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
                    amount: 5_500.0,
                    account_number: "51025-3".to_string(),
                    account_name: "Condiments".to_string(),
                    source: LineSource::Purchase,
                    entity: None,
                },
            ],
            prior_lines: vec![],
        };
        let dashboard = build_dashboard(&snapshot, &KpiStore::new(), None);
        let scorecard = score(&dashboard.quarter);
        (dashboard, scorecard)
    }

    #[test]
    fn test_format_dashboard_sections() {
        let (dashboard, scorecard) = dashboard();
        let out = format_dashboard(&dashboard, &scorecard, "T1");
        assert!(out.contains("VENTES"));
        assert!(out.contains("COÛT DES ALIMENTS"));
        assert!(out.contains("MAIN D'OEUVRE"));
        assert!(out.contains("Condiments"));
        assert!(out.contains("FCFP"));
        assert!(out.contains("T1 ($)"));
        assert!(out.contains("Janvier"));
        assert!(out.contains("480,000"));
    }

    #[test]
    fn test_points_column() {
        let (dashboard, scorecard) = dashboard();
        let out = format_dashboard(&dashboard, &scorecard, "T1");
        // FCFP points are always granted.
        assert!(out.contains("20/20"));
    }
}
