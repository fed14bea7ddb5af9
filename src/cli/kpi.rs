use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use crate::error::{ObjectifError, Result};
use crate::fmt::pct1;
use crate::settings::get_data_dir;
use crate::store::{load_kpis, save_kpis};

fn validate_month(month: &str) -> Result<()> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ObjectifError::InvalidDate(format!("{month} (expected YYYY-MM)")))
}

pub fn set(month: &str, fcfp: Option<f64>, numerique: Option<f64>) -> Result<()> {
    validate_month(month)?;
    if fcfp.is_none() && numerique.is_none() {
        return Err(ObjectifError::Other(
            "nothing to record: pass --fcfp and/or --numerique".to_string(),
        ));
    }

    let data_dir = get_data_dir();
    let mut kpis = load_kpis(&data_dir);
    let entry = kpis.entry(month.to_string()).or_default();
    if let Some(value) = fcfp {
        entry.fcfp = value;
    }
    if let Some(value) = numerique {
        entry.numerique = value;
    }
    let recorded = *entry;
    save_kpis(&kpis, &data_dir)?;

    println!(
        "Recorded {month}: FCFP {:.0}, Numérique {}",
        recorded.fcfp,
        pct1(recorded.numerique)
    );
    Ok(())
}

pub fn list() -> Result<()> {
    let kpis = load_kpis(&get_data_dir());
    if kpis.is_empty() {
        println!("No KPIs recorded. Use `objectif kpi set --month YYYY-MM ...`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Month", "FCFP", "Numérique"]);
    for (month, kpi) in &kpis {
        table.add_row(vec![
            Cell::new(month),
            Cell::new(format!("{:.0}", kpi.fcfp)),
            Cell::new(pct1(kpi.numerique)),
        ]);
    }
    println!("{table}");
    Ok(())
}
