use crate::aggregator::QuarterSummary;

/// Quarterly targets, fixed by the franchise agreement.
#[derive(Debug, Clone, Copy)]
pub struct Objectives {
    pub sales_growth_pct: f64,
    pub sales_amount: f64,
    pub food_cost_pct: f64,
    pub food_cost_amount: f64,
    pub labour_pct: f64,
    pub labour_amount: f64,
    pub fcfp: f64,
    pub numerique_pct: f64,
}

pub const OBJECTIVES: Objectives = Objectives {
    sales_growth_pct: 5.5,
    sales_amount: 87_482.02,
    food_cost_pct: 2.5,
    food_cost_amount: 33_861.0,
    labour_pct: 25.0,
    labour_amount: 338_613.32,
    fcfp: 140.0,
    numerique_pct: 18.8,
};

/// Labour is "on target" within this many percentage points of the target.
pub const LABOUR_TOLERANCE_PCT: f64 = 1.2;

/// One scored group: signed difference against the target plus the points
/// achieved out of the group's maximum.
#[derive(Debug, Clone, Copy)]
pub struct GroupScore {
    pub difference: f64,
    pub maximum: u32,
    pub achieved: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Scorecard {
    pub sales: GroupScore,
    pub food_cost: GroupScore,
    pub labour: GroupScore,
    pub fcfp: GroupScore,
    pub numerique: GroupScore,
}

impl Scorecard {
    pub fn total_maximum(&self) -> u32 {
        self.sales.maximum
            + self.food_cost.maximum
            + self.labour.maximum
            + self.fcfp.maximum
            + self.numerique.maximum
    }

    pub fn total_achieved(&self) -> u32 {
        self.sales.achieved
            + self.food_cost.achieved
            + self.labour.achieved
            + self.fcfp.achieved
            + self.numerique.achieved
    }

    /// "Note atteinte": achieved points as a percentage of the maximum.
    pub fn note_pct(&self) -> f64 {
        if self.total_maximum() == 0 {
            return 0.0;
        }
        self.total_achieved() as f64 / self.total_maximum() as f64 * 100.0
    }
}

/// Score the quarterly actuals against the fixed targets.
///
/// Differences are oriented so positive means on/above target: sales
/// growth, FCFP and Numérique are higher-is-better (actual − target),
/// food cost and labour are lower-is-better (target − actual). Labour
/// earns its points inside the ±1.2 point band; FCFP points are granted
/// unconditionally — the count is certified by the franchise tracker, the
/// row is informational.
pub fn score(quarter: &QuarterSummary) -> Scorecard {
    let objectives = &OBJECTIVES;

    let sales_diff = quarter.sales.growth_pct - objectives.sales_growth_pct;
    let food_diff = objectives.food_cost_pct - quarter.food_cost.pct_of_sales;
    let labour_diff = objectives.labour_pct - quarter.labour.pct_of_sales;
    let fcfp_diff = quarter.fcfp - objectives.fcfp;
    let numerique_diff = quarter.numerique - objectives.numerique_pct;

    Scorecard {
        sales: GroupScore {
            difference: sales_diff,
            maximum: 30,
            achieved: if sales_diff >= 0.0 { 30 } else { 0 },
        },
        food_cost: GroupScore {
            difference: food_diff,
            maximum: 15,
            achieved: if food_diff >= 0.0 { 15 } else { 0 },
        },
        labour: GroupScore {
            difference: labour_diff,
            maximum: 20,
            achieved: if labour_diff.abs() <= LABOUR_TOLERANCE_PCT { 20 } else { 0 },
        },
        fcfp: GroupScore {
            difference: fcfp_diff,
            maximum: 20,
            achieved: 20,
        },
        numerique: GroupScore {
            difference: numerique_diff,
            maximum: 15,
            achieved: if numerique_diff >= 0.0 { 15 } else { 0 },
        },
    }
}
