use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::categorizer::{bucket_for_line, Bucket, FoodCostCategory, LabourCategory};
use crate::error::{ObjectifError, Result};
use crate::models::{KpiStore, Snapshot, TxnLine};

// ---------------------------------------------------------------------------
// Summary structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SalesSummary {
    pub actual: f64,
    pub prior_year: f64,
    pub growth_pct: f64,
}

#[derive(Debug, Clone, Default)]
pub struct FoodCostSummary {
    pub raw_waste: f64,
    pub completed_waste: f64,
    pub condiments: f64,
    pub employee_meals: f64,
    pub stat: f64,
    pub total: f64,
    pub pct_of_sales: f64,
}

impl FoodCostSummary {
    pub fn amount(&self, category: FoodCostCategory) -> f64 {
        match category {
            FoodCostCategory::RawWaste => self.raw_waste,
            FoodCostCategory::CompletedWaste => self.completed_waste,
            FoodCostCategory::Condiments => self.condiments,
            FoodCostCategory::EmployeeMeals => self.employee_meals,
            FoodCostCategory::Stat => self.stat,
        }
    }

    fn add(&mut self, category: FoodCostCategory, amount: f64) {
        match category {
            FoodCostCategory::RawWaste => self.raw_waste += amount,
            FoodCostCategory::CompletedWaste => self.completed_waste += amount,
            FoodCostCategory::Condiments => self.condiments += amount,
            FoodCostCategory::EmployeeMeals => self.employee_meals += amount,
            FoodCostCategory::Stat => self.stat += amount,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LabourSummary {
    pub crew: f64,
    pub management: f64,
    pub total: f64,
    pub pct_of_sales: f64,
    pub crew_pct: f64,
    pub management_pct: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MonthSummary {
    /// "YYYY-MM"
    pub month: String,
    pub sales: SalesSummary,
    pub food_cost: FoodCostSummary,
    pub labour: LabourSummary,
    pub fcfp: f64,
    pub numerique: f64,
}

/// Totals over the selected range. Percentages are recomputed from the
/// range totals, not averaged from monthly percentages; FCFP and Numérique
/// are the two exceptions and are averaged across months.
#[derive(Debug, Clone, Default)]
pub struct QuarterSummary {
    pub sales: SalesSummary,
    pub food_cost: FoodCostSummary,
    pub labour: LabourSummary,
    pub fcfp: f64,
    pub numerique: f64,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub months: Vec<MonthSummary>,
    pub quarter: QuarterSummary,
}

// ---------------------------------------------------------------------------
// Arithmetic helpers
// ---------------------------------------------------------------------------

/// Percentage of sales, short-circuited to 0 when there are no sales.
pub fn pct_of(amount: f64, sales: f64) -> f64 {
    if sales > 0.0 {
        amount / sales * 100.0
    } else {
        0.0
    }
}

/// Year-over-year growth percentage, 0 when there is no prior-year base.
pub fn growth_pct(actual: f64, prior: f64) -> f64 {
    if prior > 0.0 {
        (actual - prior) / prior * 100.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Date-range helpers
// ---------------------------------------------------------------------------

/// "YYYY-MM" keys for every calendar month touched by [start, end].
pub fn months_in_range(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let mut months = Vec::new();
    let mut current = start.with_day(1).unwrap_or(start);
    while current <= end {
        months.push(current.format("%Y-%m").to_string());
        current = next_month(current);
    }
    months
}

fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // First of a valid month always exists.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Calendar date range for a quarter: "T1".."T4".
pub fn quarter_range(quarter: &str, year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let (start_month, end_month, end_day) = match quarter.to_uppercase().as_str() {
        "T1" => (1, 3, 31),
        "T2" => (4, 6, 30),
        "T3" => (7, 9, 30),
        "T4" => (10, 12, 31),
        other => {
            return Err(ObjectifError::InvalidDate(format!(
                "unknown quarter '{other}' (expected T1, T2, T3 or T4)"
            )))
        }
    };
    let start = NaiveDate::from_ymd_opt(year, start_month, 1)
        .ok_or_else(|| ObjectifError::InvalidDate(format!("{year}-{start_month:02}-01")))?;
    let end = NaiveDate::from_ymd_opt(year, end_month, end_day)
        .ok_or_else(|| ObjectifError::InvalidDate(format!("{year}-{end_month:02}-{end_day}")))?;
    Ok((start, end))
}

/// "T1".."T4" label for the quarter containing `date`.
pub fn quarter_label(date: NaiveDate) -> String {
    format!("T{}", (date.month() - 1) / 3 + 1)
}

// ---------------------------------------------------------------------------
// Dashboard assembly
// ---------------------------------------------------------------------------

fn entity_matches(line: &TxnLine, restaurant: Option<&str>) -> bool {
    match restaurant {
        Some(name) => line.entity.as_deref() == Some(name),
        None => true,
    }
}

/// Categorize and aggregate a snapshot into the dashboard structure.
///
/// KPI values come from the manual store; months without an entry render
/// as 0. When `restaurant` is set, lines for other entities are dropped.
pub fn build_dashboard(
    snapshot: &Snapshot,
    kpis: &KpiStore,
    restaurant: Option<&str>,
) -> Dashboard {
    let month_keys = months_in_range(snapshot.start, snapshot.end);

    // Prior-year sales by the *current* month key they compare against.
    let mut prior_sales: HashMap<String, f64> = HashMap::new();
    for line in &snapshot.prior_lines {
        if !entity_matches(line, restaurant) {
            continue;
        }
        if bucket_for_line(line) == Bucket::Sales {
            let shifted = format!("{:04}-{:02}", line.date.year() + 1, line.date.month());
            *prior_sales.entry(shifted).or_default() += line.amount;
        }
    }

    let mut months: Vec<MonthSummary> = month_keys
        .iter()
        .map(|key| MonthSummary {
            month: key.clone(),
            ..Default::default()
        })
        .collect();
    let index: HashMap<&str, usize> = month_keys
        .iter()
        .enumerate()
        .map(|(i, key)| (key.as_str(), i))
        .collect();

    for line in &snapshot.lines {
        if !entity_matches(line, restaurant) {
            continue;
        }
        let Some(&i) = index.get(line.month_key().as_str()) else {
            continue; // outside the selected range
        };
        let summary = &mut months[i];
        match bucket_for_line(line) {
            Bucket::Sales => summary.sales.actual += line.amount,
            Bucket::FoodCost(category) => summary.food_cost.add(category, line.amount),
            Bucket::Labour(LabourCategory::Crew) => summary.labour.crew += line.amount,
            Bucket::Labour(LabourCategory::Management) => {
                summary.labour.management += line.amount
            }
            Bucket::Uncategorized => {}
        }
    }

    for summary in &mut months {
        summary.sales.prior_year = prior_sales.get(&summary.month).copied().unwrap_or(0.0);
        summary.sales.growth_pct = growth_pct(summary.sales.actual, summary.sales.prior_year);

        let fc = &mut summary.food_cost;
        fc.total = fc.raw_waste + fc.completed_waste + fc.condiments + fc.employee_meals + fc.stat;
        fc.pct_of_sales = pct_of(fc.total, summary.sales.actual);

        let lb = &mut summary.labour;
        lb.total = lb.crew + lb.management;
        lb.pct_of_sales = pct_of(lb.total, summary.sales.actual);
        lb.crew_pct = pct_of(lb.crew, summary.sales.actual);
        lb.management_pct = pct_of(lb.management, summary.sales.actual);

        if let Some(kpi) = kpis.get(&summary.month) {
            summary.fcfp = kpi.fcfp;
            summary.numerique = kpi.numerique;
        }
    }

    let quarter = summarize_quarter(&months);
    Dashboard { months, quarter }
}

fn summarize_quarter(months: &[MonthSummary]) -> QuarterSummary {
    let mut quarter = QuarterSummary::default();
    for m in months {
        quarter.sales.actual += m.sales.actual;
        quarter.sales.prior_year += m.sales.prior_year;
        quarter.food_cost.raw_waste += m.food_cost.raw_waste;
        quarter.food_cost.completed_waste += m.food_cost.completed_waste;
        quarter.food_cost.condiments += m.food_cost.condiments;
        quarter.food_cost.employee_meals += m.food_cost.employee_meals;
        quarter.food_cost.stat += m.food_cost.stat;
        quarter.labour.crew += m.labour.crew;
        quarter.labour.management += m.labour.management;
        quarter.fcfp += m.fcfp;
        quarter.numerique += m.numerique;
    }

    quarter.sales.growth_pct = growth_pct(quarter.sales.actual, quarter.sales.prior_year);

    let fc = &mut quarter.food_cost;
    fc.total = fc.raw_waste + fc.completed_waste + fc.condiments + fc.employee_meals + fc.stat;
    fc.pct_of_sales = pct_of(fc.total, quarter.sales.actual);

    let lb = &mut quarter.labour;
    lb.total = lb.crew + lb.management;
    lb.pct_of_sales = pct_of(lb.total, quarter.sales.actual);
    lb.crew_pct = pct_of(lb.crew, quarter.sales.actual);
    lb.management_pct = pct_of(lb.management, quarter.sales.actual);

    if !months.is_empty() {
        quarter.fcfp /= months.len() as f64;
        quarter.numerique /= months.len() as f64;
    }

    quarter
}
