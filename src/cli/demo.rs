use chrono::{Datelike, Local, NaiveDate, Utc};
use rand::Rng;

use crate::aggregator::{months_in_range, quarter_range};
use crate::error::Result;
use crate::models::{KpiStore, LineSource, MonthlyKpi, Snapshot, TxnLine};
use crate::settings::load_settings;
use crate::store::{load_kpis, save_kpis, save_snapshot, snapshot_path};

/// Food-cost accounts with monthly amount ranges (whole dollars).
const FOOD_ACCOUNTS: &[(&str, &str, i64, i64)] = &[
    ("51025-1", "Perte brute", 2_000, 5_000),
    ("51025-2", "Perte complétée", 1_000, 3_000),
    ("51025-3", "Condiments", 3_000, 7_000),
    ("51025-4", "Aliments employés", 1_500, 4_000),
    ("51100", "Coût des aliments STAT", 8_000, 15_000),
];

/// Weekly sales deposits land on these days.
const SALES_DAYS: &[u32] = &[4, 11, 18, 25];

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Demo days never exceed 28.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn parse_month_key(key: &str) -> (i32, u32) {
    let mut parts = key.split('-');
    let year = parts.next().and_then(|s| s.parse().ok()).unwrap_or(2026);
    let month = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    (year, month)
}

/// Build a synthetic quarter of lines for every restaurant. Amounts are
/// drawn from the same ranges the sample books use; sums land well inside
/// the dashboard's expected shape (food ~3%, labour ~25% of sales).
pub fn generate_snapshot(
    rng: &mut impl Rng,
    start: NaiveDate,
    end: NaiveDate,
    restaurants: &[String],
) -> Snapshot {
    let mut lines = Vec::new();
    let mut prior_lines = Vec::new();

    for key in months_in_range(start, end) {
        let (year, month) = parse_month_key(&key);
        for restaurant in restaurants {
            let entity = Some(restaurant.clone());

            // Sales: four weekly invoices, 450k–600k per month in total.
            for day in SALES_DAYS {
                lines.push(TxnLine {
                    date: ymd(year, month, *day),
                    amount: rng.gen_range(112_500..150_000) as f64,
                    account_number: String::new(),
                    account_name: "Ventes".to_string(),
                    source: LineSource::Invoice,
                    entity: entity.clone(),
                });
                prior_lines.push(TxnLine {
                    date: ymd(year - 1, month, *day),
                    amount: rng.gen_range(100_000..137_500) as f64,
                    account_number: String::new(),
                    account_name: "Ventes".to_string(),
                    source: LineSource::Invoice,
                    entity: entity.clone(),
                });
            }

            // Food cost: one purchase per account.
            for (i, (number, name, lo, hi)) in FOOD_ACCOUNTS.iter().enumerate() {
                lines.push(TxnLine {
                    date: ymd(year, month, 10 + 2 * i as u32),
                    amount: rng.gen_range(*lo..*hi) as f64,
                    account_number: number.to_string(),
                    account_name: name.to_string(),
                    source: LineSource::Purchase,
                    entity: entity.clone(),
                });
            }

            // Labour: month-end journal lines for crew and management.
            lines.push(TxnLine {
                date: ymd(year, month, 28),
                amount: rng.gen_range(80_000..100_000) as f64,
                account_number: "60100".to_string(),
                account_name: "M-O Équipiers".to_string(),
                source: LineSource::JournalEntry,
                entity: entity.clone(),
            });
            lines.push(TxnLine {
                date: ymd(year, month, 28),
                amount: rng.gen_range(40_000..60_000) as f64,
                account_number: "60200".to_string(),
                account_name: "M-O Gestion".to_string(),
                source: LineSource::JournalEntry,
                entity,
            });
        }
    }

    Snapshot {
        fetched_at: Utc::now().to_rfc3339(),
        start,
        end,
        lines,
        prior_lines,
    }
}

pub fn generate_kpis(rng: &mut impl Rng, start: NaiveDate, end: NaiveDate) -> KpiStore {
    let mut kpis = KpiStore::new();
    for key in months_in_range(start, end) {
        kpis.insert(
            key,
            MonthlyKpi {
                fcfp: rng.gen_range(90..130) as f64,
                numerique: rng.gen_range(15.0..17.0),
            },
        );
    }
    kpis
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let today = Local::now().date_naive();
    let quarter = format!("T{}", (today.month() - 1) / 3 + 1);
    let (start, end) = quarter_range(&quarter, today.year())?;

    if snapshot_path(&data_dir).exists() {
        println!("Replacing existing snapshot with demo data.");
    }

    let mut rng = rand::thread_rng();
    let snapshot = generate_snapshot(&mut rng, start, end, &settings.restaurants);
    save_snapshot(&snapshot, &data_dir)?;

    // Fill KPI months that were never recorded; keep real entries.
    let mut kpis = load_kpis(&data_dir);
    for (month, kpi) in generate_kpis(&mut rng, start, end) {
        kpis.entry(month).or_insert(kpi);
    }
    save_kpis(&kpis, &data_dir)?;

    println!("Demo data loaded!");
    println!("  Period:       {start} to {end}");
    println!("  Restaurants:  {}", settings.restaurants.join(", "));
    println!("  Lines:        {}", snapshot.lines.len());
    println!();
    println!("Try these next:");
    println!("  objectif report");
    if let Some(first) = settings.restaurants.first() {
        println!("  objectif report --restaurant {first}");
    }
    println!("  objectif export html");
    println!("  objectif status");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_dashboard;
    use crate::categorizer::{bucket_for_line, Bucket};

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
    }

    #[test]
    fn test_generate_snapshot_counts() {
        let (start, end) = range();
        let restaurants = vec!["HULL".to_string(), "OTTAWA".to_string()];
        let snapshot = generate_snapshot(&mut rand::thread_rng(), start, end, &restaurants);
        // 3 months × 2 restaurants × (4 sales + 5 food + 2 labour)
        assert_eq!(snapshot.lines.len(), 3 * 2 * 11);
        // Prior year: sales lines only
        assert_eq!(snapshot.prior_lines.len(), 3 * 2 * 4);
    }

    #[test]
    fn test_generated_lines_all_categorized() {
        let (start, end) = range();
        let snapshot = generate_snapshot(
            &mut rand::thread_rng(),
            start,
            end,
            &["HULL".to_string()],
        );
        for line in snapshot.lines.iter().chain(&snapshot.prior_lines) {
            assert_ne!(bucket_for_line(line), Bucket::Uncategorized, "line: {line:?}");
            assert!(line.date >= NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        }
    }

    #[test]
    fn test_demo_dashboard_is_plausible() {
        let (start, end) = range();
        let mut rng = rand::thread_rng();
        let snapshot = generate_snapshot(&mut rng, start, end, &["HULL".to_string()]);
        let kpis = generate_kpis(&mut rng, start, end);
        let dashboard = build_dashboard(&snapshot, &kpis, Some("HULL"));

        for m in &dashboard.months {
            assert!(m.sales.actual >= 450_000.0 && m.sales.actual < 600_000.0);
            assert!(m.sales.prior_year >= 400_000.0 && m.sales.prior_year < 550_000.0);
            assert!(m.food_cost.pct_of_sales > 0.0 && m.food_cost.pct_of_sales < 10.0);
            assert!(m.labour.pct_of_sales > 15.0 && m.labour.pct_of_sales < 40.0);
            assert!(m.fcfp >= 90.0 && m.fcfp < 130.0);
            assert!(m.numerique >= 15.0 && m.numerique < 17.0);
        }
    }

    #[test]
    fn test_generate_kpis_covers_every_month() {
        let (start, end) = range();
        let kpis = generate_kpis(&mut rand::thread_rng(), start, end);
        assert_eq!(kpis.len(), 3);
        assert!(kpis.contains_key("2026-02"));
    }
}
