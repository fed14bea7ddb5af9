use crate::aggregator::{pct_of, Dashboard};
use crate::categorizer::FoodCostCategory;
use crate::chart;
use crate::fmt::{money, money0, month_label, pct, pct1};
use crate::objectives::{Scorecard, OBJECTIVES};

const STYLE: &str = r#"
.dashboard-table {
    width: 100%;
    border-collapse: collapse;
    font-size: 14px;
}
.dashboard-table th, .dashboard-table td {
    border: 1px solid #ddd;
    padding: 8px;
    text-align: right;
}
.dashboard-table th {
    background-color: #f2f2f2;
    font-weight: bold;
    text-align: center;
}
.header-row {
    background-color: #FFC107;
    font-weight: bold;
}
.category-row {
    background-color: #FFF8E1;
    font-weight: bold;
}
.data-row {
    background-color: #FFFDE7;
}
.total-row {
    background-color: #FFF8E1;
    font-weight: bold;
}
.charts {
    display: flex;
    gap: 24px;
    flex-wrap: wrap;
    margin-top: 24px;
}
"#;

fn color_for(value: f64) -> &'static str {
    if value < 0.0 {
        "red"
    } else {
        "green"
    }
}

fn cell(out: &mut String, content: &str) {
    out.push_str(&format!("<td>{content}</td>"));
}

fn colored_cell(out: &mut String, content: &str, value: f64) {
    out.push_str(&format!(
        "<td style='color:{}'>{content}</td>",
        color_for(value)
    ));
}

fn empty_cells(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push_str("<td></td>");
    }
}

fn category_row(out: &mut String, label: &str, span: usize) {
    out.push_str(&format!(
        "<tr class=\"category-row\"><td>{label}</td><td colspan=\"{span}\"></td></tr>"
    ));
}

/// The quarterly results table, row for row the client's sheet layout.
pub fn render_table(dashboard: &Dashboard, scorecard: &Scorecard, quarter: &str) -> String {
    let months = &dashboard.months;
    let q = &dashboard.quarter;
    let objectives = &OBJECTIVES;
    // months + T($) + T(%) + objectives (%, $, différence) + maximum + atteint
    let span = months.len() + 7;

    let mut out = String::new();
    out.push_str("<table class=\"dashboard-table\">");

    // Header
    out.push_str("<tr class=\"header-row\"><th>Critères</th>");
    for m in months {
        out.push_str(&format!("<th>{}</th>", month_label(&m.month)));
    }
    out.push_str(&format!(
        "<th>{quarter} ($)</th><th>{quarter} (%)</th><th>%</th><th>$</th>\
         <th>Différence</th><th>Maximum</th><th>Atteint</th></tr>"
    ));

    // — Ventes —
    category_row(&mut out, "Ventes", span);

    let year = months
        .first()
        .and_then(|m| m.month.split('-').next())
        .unwrap_or("")
        .to_string();
    out.push_str(&format!("<tr class=\"data-row\"><td>{year}</td>"));
    for m in months {
        cell(&mut out, &money0(m.sales.actual));
    }
    cell(&mut out, &money0(q.sales.actual));
    empty_cells(&mut out, 6);
    out.push_str("</tr>");

    out.push_str("<tr class=\"data-row\"><td>Année précédente</td>");
    for m in months {
        cell(&mut out, &money0(m.sales.prior_year));
    }
    cell(&mut out, &money0(q.sales.prior_year));
    empty_cells(&mut out, 6);
    out.push_str("</tr>");

    out.push_str("<tr class=\"data-row\"><td>Croissance</td>");
    for m in months {
        colored_cell(&mut out, &pct(m.sales.growth_pct), m.sales.growth_pct);
    }
    colored_cell(&mut out, &pct(q.sales.growth_pct), q.sales.growth_pct);
    cell(&mut out, "");
    cell(&mut out, &pct1(objectives.sales_growth_pct));
    cell(&mut out, &money(objectives.sales_amount));
    colored_cell(&mut out, &pct1(scorecard.sales.difference), scorecard.sales.difference);
    cell(&mut out, &format!("{}%", scorecard.sales.maximum));
    cell(&mut out, &format!("{}%", scorecard.sales.achieved));
    out.push_str("</tr>");

    // — Coût des aliments —
    category_row(&mut out, "Coût des aliments", span);

    for category in FoodCostCategory::ALL {
        out.push_str(&format!("<tr class=\"data-row\"><td>{}</td>", category.label()));
        for m in months {
            cell(&mut out, &money0(m.food_cost.amount(category)));
        }
        let quarterly = q.food_cost.amount(category);
        cell(&mut out, &money0(quarterly));
        cell(&mut out, &pct(pct_of(quarterly, q.sales.actual)));
        cell(&mut out, &pct(category.objective_pct()));
        empty_cells(&mut out, 4);
        out.push_str("</tr>");
    }

    out.push_str("<tr class=\"total-row\"><td>Total ($)</td>");
    for m in months {
        cell(&mut out, &money0(m.food_cost.total));
    }
    cell(&mut out, &money0(q.food_cost.total));
    cell(&mut out, "");
    cell(&mut out, "");
    cell(&mut out, &money0(objectives.food_cost_amount));
    empty_cells(&mut out, 3);
    out.push_str("</tr>");

    out.push_str("<tr class=\"total-row\"><td>Total (%)</td>");
    for m in months {
        cell(&mut out, &pct(m.food_cost.pct_of_sales));
    }
    cell(&mut out, &pct(q.food_cost.pct_of_sales));
    cell(&mut out, "");
    cell(&mut out, &pct(objectives.food_cost_pct));
    cell(&mut out, "");
    colored_cell(
        &mut out,
        &pct(scorecard.food_cost.difference),
        scorecard.food_cost.difference,
    );
    cell(&mut out, &format!("{}%", scorecard.food_cost.maximum));
    cell(&mut out, &format!("{}%", scorecard.food_cost.achieved));
    out.push_str("</tr>");

    // — Main d'oeuvre —
    category_row(&mut out, "Main d'oeuvre", span);

    out.push_str("<tr class=\"data-row\"><td>M-O Équipiers, CdQ ($)</td>");
    for m in months {
        cell(&mut out, &money0(m.labour.crew));
    }
    cell(&mut out, &money0(q.labour.crew));
    empty_cells(&mut out, 6);
    out.push_str("</tr>");

    out.push_str("<tr class=\"data-row\"><td>M-O Équipiers, CdQ (%)</td>");
    for m in months {
        cell(&mut out, &pct1(m.labour.crew_pct));
    }
    cell(&mut out, &pct1(q.labour.crew_pct));
    empty_cells(&mut out, 6);
    out.push_str("</tr>");

    out.push_str("<tr class=\"data-row\"><td>Gestion ($)</td>");
    for m in months {
        cell(&mut out, &money0(m.labour.management));
    }
    cell(&mut out, &money0(q.labour.management));
    empty_cells(&mut out, 6);
    out.push_str("</tr>");

    out.push_str("<tr class=\"data-row\"><td>Gestion (%)</td>");
    for m in months {
        cell(&mut out, &pct1(m.labour.management_pct));
    }
    cell(&mut out, &pct1(q.labour.management_pct));
    empty_cells(&mut out, 6);
    out.push_str("</tr>");

    out.push_str("<tr class=\"total-row\"><td>Total ($)</td>");
    for m in months {
        cell(&mut out, &money0(m.labour.total));
    }
    cell(&mut out, &money0(q.labour.total));
    cell(&mut out, "");
    cell(&mut out, "");
    cell(&mut out, &money(objectives.labour_amount));
    empty_cells(&mut out, 3);
    out.push_str("</tr>");

    out.push_str("<tr class=\"total-row\"><td>Total (%)</td>");
    for m in months {
        cell(&mut out, &pct1(m.labour.pct_of_sales));
    }
    cell(&mut out, &pct1(q.labour.pct_of_sales));
    cell(&mut out, "");
    cell(&mut out, &pct1(objectives.labour_pct));
    cell(&mut out, "");
    colored_cell(&mut out, &pct1(scorecard.labour.difference), scorecard.labour.difference);
    cell(&mut out, &format!("{}%", scorecard.labour.maximum));
    cell(&mut out, &format!("{}%", scorecard.labour.achieved));
    out.push_str("</tr>");

    // — FCFP —
    out.push_str("<tr class=\"category-row\"><td>FCFP</td>");
    for m in months {
        cell(&mut out, &format!("{:.0}", m.fcfp));
    }
    cell(&mut out, &format!("{:.0}", q.fcfp));
    cell(&mut out, "");
    cell(&mut out, &format!("{:.0}", objectives.fcfp));
    cell(&mut out, "");
    cell(&mut out, &format!("{:.0}", scorecard.fcfp.difference));
    cell(&mut out, &format!("{}%", scorecard.fcfp.maximum));
    cell(&mut out, &format!("{}%", scorecard.fcfp.achieved));
    out.push_str("</tr>");

    // — Numérique —
    out.push_str("<tr class=\"category-row\"><td>Numérique</td>");
    for m in months {
        cell(&mut out, &pct1(m.numerique));
    }
    cell(&mut out, &pct(q.numerique));
    cell(&mut out, "");
    cell(&mut out, &pct1(objectives.numerique_pct));
    cell(&mut out, "");
    colored_cell(
        &mut out,
        &pct(scorecard.numerique.difference),
        scorecard.numerique.difference,
    );
    cell(&mut out, &format!("{}%", scorecard.numerique.maximum));
    cell(&mut out, &format!("{}%", scorecard.numerique.achieved));
    out.push_str("</tr>");

    // — Note atteinte —
    out.push_str(&format!(
        "<tr><td colspan=\"{}\"></td><td>Note Atteinte</td><td>{}</td></tr>",
        months.len() + 6,
        pct1(scorecard.note_pct()),
    ));

    out.push_str("</table>");
    out
}

/// Complete standalone HTML document: results table plus the two trend
/// charts.
pub fn render_page(dashboard: &Dashboard, scorecard: &Scorecard, restaurant: &str) -> String {
    let quarter = dashboard
        .months
        .first()
        .and_then(|m| {
            m.month
                .split('-')
                .nth(1)
                .and_then(|s| s.parse::<u32>().ok())
        })
        .map(|month| format!("T{}", (month - 1) / 3 + 1))
        .unwrap_or_else(|| "Période".to_string());

    let combined_target = OBJECTIVES.food_cost_pct + OBJECTIVES.labour_pct;

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>Résultats {restaurant}</title>\n"));
    out.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));
    out.push_str(&format!("<h1>Résultats {restaurant}</h1>\n"));
    out.push_str(&render_table(dashboard, scorecard, &quarter));
    out.push_str("\n<h2>Analyse des tendances</h2>\n<div class=\"charts\">\n");
    out.push_str("<div><h3>Évolution des ventes</h3>\n");
    out.push_str(&chart::sales_line_chart(&dashboard.months));
    out.push_str("</div>\n<div><h3>Pourcentages des coûts</h3>\n");
    out.push_str(&chart::cost_pct_chart(&dashboard.months, combined_target));
    out.push_str("</div>\n</div>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_dashboard;
    use crate::models::{KpiStore, LineSource, MonthlyKpi, Snapshot, TxnLine};
    use crate::objectives::score;
    use chrono::NaiveDate;

    fn sample_dashboard() -> Dashboard {
        let line = |date: &str, amount: f64, account: &str| TxnLine {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount,
            account_number: account.to_string(),
            account_name: account.to_string(),
            source: LineSource::JournalEntry,
            entity: None,
        };
        let snapshot = Snapshot {
            fetched_at: String::new(),
            start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            lines: vec![
                line("2026-01-10", 500_000.0, "40100"),
                line("2026-02-10", 520_000.0, "40100"),
                line("2026-03-10", 480_000.0, "40100"),
                line("2026-01-12", 4_000.0, "51025-1"),
                line("2026-01-13", 6_000.0, "51025-3"),
                line("2026-01-14", 9_000.0, "51100"),
                line("2026-01-20", 90_000.0, "60100"),
                line("2026-01-21", 50_000.0, "60200"),
            ],
            prior_lines: vec![line("2025-01-10", 450_000.0, "40100")],
        };
        let mut kpis = KpiStore::new();
        kpis.insert("2026-01".to_string(), MonthlyKpi { fcfp: 120.0, numerique: 16.1 });
        build_dashboard(&snapshot, &kpis, None)
    }

    #[test]
    fn test_render_table_layout() {
        let dashboard = sample_dashboard();
        let scorecard = score(&dashboard.quarter);
        let html = render_table(&dashboard, &scorecard, "T1");
        assert!(html.contains("<th>Critères</th>"));
        assert!(html.contains("<th>Janvier</th>"));
        assert!(html.contains("<th>Mars</th>"));
        assert!(html.contains("<th>T1 ($)</th>"));
        assert!(html.contains("Perte brute"));
        assert!(html.contains("Aliments employés"));
        assert!(html.contains("M-O Équipiers, CdQ ($)"));
        assert!(html.contains("Note Atteinte"));
        assert!(html.contains("$500,000"));
    }

    #[test]
    fn test_negative_deltas_render_red() {
        let dashboard = sample_dashboard();
        let scorecard = score(&dashboard.quarter);
        let html = render_table(&dashboard, &scorecard, "T1");
        // February growth is 0 (no prior-year data) but January beats its
        // prior year: both colors appear.
        assert!(html.contains("style='color:green'"));
        // Numérique is far below 18.8: a red delta must be present.
        assert!(html.contains("style='color:red'"));
    }

    #[test]
    fn test_render_page_is_standalone() {
        let dashboard = sample_dashboard();
        let scorecard = score(&dashboard.quarter);
        let html = render_page(&dashboard, &scorecard, "HULL");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Résultats HULL</h1>"));
        assert!(html.contains("dashboard-table"));
        assert!(html.contains("Évolution des ventes"));
        assert!(html.contains("<svg"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_quarter_label_derived_from_first_month() {
        let dashboard = sample_dashboard();
        let scorecard = score(&dashboard.quarter);
        let html = render_page(&dashboard, &scorecard, "HULL");
        assert!(html.contains("<th>T1 ($)</th>"));
    }
}
