use crate::aggregator::MonthSummary;
use crate::fmt::month_label;

// Chart geometry (px)
const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 40.0;
const Y_TICKS: usize = 5;

const SALES_COLOR: &str = "#1f77b4";
const PRIOR_COLOR: &str = "#ff7f0e";
const FOOD_COLOR: &str = "gold";
const LABOUR_COLOR: &str = "green";
const TARGET_COLOR: &str = "red";

fn plot_width() -> f64 {
    WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_height() -> f64 {
    HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

/// Map a value into pixel y space (SVG y grows downward).
fn y_px(value: f64, lo: f64, hi: f64) -> f64 {
    let span = if hi > lo { hi - lo } else { 1.0 };
    MARGIN_TOP + plot_height() * (1.0 - (value - lo) / span)
}

/// Center x of slot `i` out of `n`.
fn x_px(i: usize, n: usize) -> f64 {
    let slot = plot_width() / n.max(1) as f64;
    MARGIN_LEFT + slot * (i as f64 + 0.5)
}

fn svg_open(out: &mut String) {
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"sans-serif\" font-size=\"11\">"
    ));
    out.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"white\"/>"
    ));
}

/// Horizontal dashed gridlines with y-axis labels.
fn grid(out: &mut String, lo: f64, hi: f64, label: impl Fn(f64) -> String) {
    for tick in 0..=Y_TICKS {
        let value = lo + (hi - lo) * tick as f64 / Y_TICKS as f64;
        let y = y_px(value, lo, hi);
        out.push_str(&format!(
            "<line x1=\"{MARGIN_LEFT}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" \
             stroke=\"#ccc\" stroke-dasharray=\"4 3\"/>",
            WIDTH - MARGIN_RIGHT
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>",
            MARGIN_LEFT - 6.0,
            y + 4.0,
            label(value)
        ));
    }
}

fn x_labels(out: &mut String, months: &[MonthSummary]) {
    for (i, m) in months.iter().enumerate() {
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            x_px(i, months.len()),
            HEIGHT - MARGIN_BOTTOM + 16.0,
            month_label(&m.month)
        ));
    }
}

fn legend_entry(out: &mut String, x: f64, color: &str, text: &str) {
    out.push_str(&format!(
        "<rect x=\"{x:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{color}\"/>",
        MARGIN_TOP - 26.0
    ));
    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\">{text}</text>",
        x + 16.0,
        MARGIN_TOP - 16.0
    ));
}

fn thousands(value: f64) -> String {
    format!("{:.0}k", value / 1000.0)
}

/// Sales evolution: current year vs prior year, line + markers, with the
/// current-year points annotated in thousands.
pub fn sales_line_chart(months: &[MonthSummary]) -> String {
    let mut out = String::new();
    svg_open(&mut out);

    let hi = months
        .iter()
        .flat_map(|m| [m.sales.actual, m.sales.prior_year])
        .fold(0.0_f64, f64::max)
        * 1.1;
    let hi = if hi > 0.0 { hi } else { 1.0 };
    let lo = 0.0;

    grid(&mut out, lo, hi, thousands);
    x_labels(&mut out, months);
    legend_entry(&mut out, MARGIN_LEFT, SALES_COLOR, "Ventes");
    legend_entry(&mut out, MARGIN_LEFT + 120.0, PRIOR_COLOR, "Année précédente");

    let polyline = |out: &mut String, values: Vec<f64>, color: &str| {
        let points: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:.1},{:.1}", x_px(i, values.len()), y_px(*v, lo, hi)))
            .collect();
        out.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>",
            points.join(" ")
        ));
    };

    polyline(
        &mut out,
        months.iter().map(|m| m.sales.prior_year).collect(),
        PRIOR_COLOR,
    );
    polyline(
        &mut out,
        months.iter().map(|m| m.sales.actual).collect(),
        SALES_COLOR,
    );

    for (i, m) in months.iter().enumerate() {
        let x = x_px(i, months.len());
        // Prior year: square markers
        out.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"6\" height=\"6\" fill=\"{PRIOR_COLOR}\"/>",
            x - 3.0,
            y_px(m.sales.prior_year, lo, hi) - 3.0
        ));
        // Current year: circle markers, annotated
        let y = y_px(m.sales.actual, lo, hi);
        out.push_str(&format!(
            "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"4\" fill=\"{SALES_COLOR}\"/>"
        ));
        out.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            y - 10.0,
            thousands(m.sales.actual)
        ));
    }

    out.push_str("</svg>");
    out
}

/// Monthly cost percentages: food cost and labour stacked per month, with
/// the combined objective as a dashed line.
pub fn cost_pct_chart(months: &[MonthSummary], combined_target: f64) -> String {
    let mut out = String::new();
    svg_open(&mut out);

    let hi = months
        .iter()
        .map(|m| m.food_cost.pct_of_sales + m.labour.pct_of_sales)
        .fold(combined_target, f64::max)
        * 1.15;
    let hi = if hi > 0.0 { hi } else { 1.0 };
    let lo = 0.0;

    grid(&mut out, lo, hi, |v| format!("{v:.0}%"));
    x_labels(&mut out, months);
    legend_entry(&mut out, MARGIN_LEFT, FOOD_COLOR, "Coût des aliments (%)");
    legend_entry(&mut out, MARGIN_LEFT + 170.0, LABOUR_COLOR, "Main d'oeuvre (%)");

    let bar_width = plot_width() / months.len().max(1) as f64 * 0.6;
    for (i, m) in months.iter().enumerate() {
        let x = x_px(i, months.len()) - bar_width / 2.0;
        let food_top = y_px(m.food_cost.pct_of_sales, lo, hi);
        let stack_top = y_px(m.food_cost.pct_of_sales + m.labour.pct_of_sales, lo, hi);
        let base = y_px(0.0, lo, hi);
        out.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{food_top:.1}\" width=\"{bar_width:.1}\" \
             height=\"{:.1}\" fill=\"{FOOD_COLOR}\"/>",
            base - food_top
        ));
        out.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{stack_top:.1}\" width=\"{bar_width:.1}\" \
             height=\"{:.1}\" fill=\"{LABOUR_COLOR}\"/>",
            food_top - stack_top
        ));
    }

    let target_y = y_px(combined_target, lo, hi);
    out.push_str(&format!(
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{target_y:.1}\" x2=\"{:.1}\" y2=\"{target_y:.1}\" \
         stroke=\"{TARGET_COLOR}\" stroke-width=\"2\" stroke-dasharray=\"6 4\"/>",
        WIDTH - MARGIN_RIGHT
    ));
    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" fill=\"{TARGET_COLOR}\">\
         Objectif combiné ({combined_target}%)</text>",
        WIDTH - MARGIN_RIGHT - 4.0,
        target_y - 6.0
    ));

    out.push_str("</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{FoodCostSummary, LabourSummary, SalesSummary};

    fn month(key: &str, sales: f64, prior: f64, food_pct: f64, labour_pct: f64) -> MonthSummary {
        MonthSummary {
            month: key.to_string(),
            sales: SalesSummary { actual: sales, prior_year: prior, growth_pct: 0.0 },
            food_cost: FoodCostSummary { pct_of_sales: food_pct, ..Default::default() },
            labour: LabourSummary { pct_of_sales: labour_pct, ..Default::default() },
            fcfp: 0.0,
            numerique: 0.0,
        }
    }

    fn sample() -> Vec<MonthSummary> {
        vec![
            month("2026-01", 500_000.0, 450_000.0, 3.2, 26.0),
            month("2026-02", 520_000.0, 470_000.0, 2.8, 24.5),
            month("2026-03", 480_000.0, 460_000.0, 3.0, 25.1),
        ]
    }

    #[test]
    fn test_sales_chart_shape() {
        let svg = sales_line_chart(&sample());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("500k"));
        assert!(svg.contains("Janvier"));
        assert!(svg.contains("Année précédente"));
    }

    #[test]
    fn test_cost_chart_shape() {
        let svg = cost_pct_chart(&sample(), 27.5);
        // Two stacked segments per month
        assert_eq!(svg.matches(&format!("fill=\"{FOOD_COLOR}\"")).count(), 3 + 1); // bars + legend
        assert!(svg.contains("Objectif combiné (27.5%)"));
        assert!(svg.contains("stroke-dasharray=\"6 4\""));
    }

    #[test]
    fn test_empty_months_do_not_panic() {
        let svg = sales_line_chart(&[]);
        assert!(svg.contains("</svg>"));
        let svg = cost_pct_chart(&[], 27.5);
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_y_px_orientation() {
        // Larger values sit higher on the canvas (smaller y).
        assert!(y_px(100.0, 0.0, 100.0) < y_px(0.0, 0.0, 100.0));
    }
}
