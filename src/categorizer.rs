use crate::models::{LineSource, TxnLine};

/// Food-cost sub-categories, as they appear on the quarterly results sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodCostCategory {
    RawWaste,
    CompletedWaste,
    Condiments,
    EmployeeMeals,
    Stat,
}

impl FoodCostCategory {
    pub const ALL: [FoodCostCategory; 5] = [
        FoodCostCategory::RawWaste,
        FoodCostCategory::CompletedWaste,
        FoodCostCategory::Condiments,
        FoodCostCategory::EmployeeMeals,
        FoodCostCategory::Stat,
    ];

    /// Display label, carried verbatim from the client's reporting sheet.
    pub fn label(&self) -> &'static str {
        match self {
            FoodCostCategory::RawWaste => "Perte brute",
            FoodCostCategory::CompletedWaste => "Perte complétée",
            FoodCostCategory::Condiments => "Condiments",
            FoodCostCategory::EmployeeMeals => "Aliments employés",
            FoodCostCategory::Stat => "STAT",
        }
    }

    /// Reference percentage-of-sales shown next to each food-cost row.
    pub fn objective_pct(&self) -> f64 {
        match self {
            FoodCostCategory::RawWaste => 0.50,
            FoodCostCategory::CompletedWaste => 0.25,
            FoodCostCategory::Condiments => 1.00,
            FoodCostCategory::EmployeeMeals => 0.40,
            FoodCostCategory::Stat => 0.50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabourCategory {
    Crew,
    Management,
}

impl LabourCategory {
    pub fn label(&self) -> &'static str {
        match self {
            LabourCategory::Crew => "Équipiers",
            LabourCategory::Management => "Gestion",
        }
    }
}

/// Dashboard bucket for a transaction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Sales,
    FoodCost(FoodCostCategory),
    Labour(LabourCategory),
    Uncategorized,
}

/// The four named food-cost accounts. Most specific prefixes first; any
/// other 51-prefixed account is presumed STAT.
const FOOD_COST_PREFIXES: &[(&str, FoodCostCategory)] = &[
    ("51025-1", FoodCostCategory::RawWaste),
    ("51025-2", FoodCostCategory::CompletedWaste),
    ("51025-3", FoodCostCategory::Condiments),
    ("51025-4", FoodCostCategory::EmployeeMeals),
];

/// Account 60100 is crew labour; every other 60xxx account is management.
const CREW_ACCOUNT: &str = "60100";

/// Map an account number to its food-cost category. Only meaningful for
/// 51-prefixed accounts; anything unmatched is STAT.
pub fn categorize_food_cost(account_number: &str) -> FoodCostCategory {
    for (prefix, category) in FOOD_COST_PREFIXES {
        if account_number.starts_with(prefix) {
            return *category;
        }
    }
    FoodCostCategory::Stat
}

/// Total mapping from account number to dashboard bucket: every input maps
/// to exactly one bucket, unknown prefixes degrade to Uncategorized.
pub fn categorize(account_number: &str) -> Bucket {
    if account_number.starts_with("401") {
        return Bucket::Sales;
    }
    if account_number.starts_with("51") {
        return Bucket::FoodCost(categorize_food_cost(account_number));
    }
    if account_number.starts_with("60") {
        if account_number == CREW_ACCOUNT {
            return Bucket::Labour(LabourCategory::Crew);
        }
        return Bucket::Labour(LabourCategory::Management);
    }
    Bucket::Uncategorized
}

/// Bucket for a fetched line. Invoice lines carry no expense account and
/// are sales by construction; everything else goes through the prefix table.
pub fn bucket_for_line(line: &TxnLine) -> Bucket {
    match line.source {
        LineSource::Invoice => Bucket::Sales,
        _ => categorize(&line.account_number),
    }
}
