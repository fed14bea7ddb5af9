use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which QuickBooks entity a transaction line was flattened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineSource {
    JournalEntry,
    Invoice,
    Purchase,
}

/// One signed transaction line. Credit postings are negated at fetch time,
/// so amounts here sum directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxnLine {
    pub date: NaiveDate,
    pub amount: f64,
    /// Chart-of-accounts number; empty for invoice lines, which are sales
    /// by construction.
    pub account_number: String,
    pub account_name: String,
    pub source: LineSource,
    /// Restaurant (entity/customer) name, when QuickBooks carries one.
    pub entity: Option<String>,
}

impl TxnLine {
    /// "YYYY-MM" bucket key for monthly aggregation.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

/// Chart-of-accounts master data, keyed by account id in [`Snapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub name: String,
    pub number: String,
    pub account_type: String,
    pub sub_type: String,
}

/// Result of one `objectif fetch`, cached in the data directory so report
/// and export commands re-render without refetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub fetched_at: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub lines: Vec<TxnLine>,
    /// Same range shifted one year back, for sales-growth comparison.
    pub prior_lines: Vec<TxnLine>,
}

/// Monthly KPI values recorded by hand (`objectif kpi set`) — these come
/// from the franchise tracker, not QuickBooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyKpi {
    #[serde(default)]
    pub fcfp: f64,
    #[serde(default)]
    pub numerique: f64,
}

/// KPI store: "YYYY-MM" -> values. BTreeMap keeps listings in month order.
pub type KpiStore = BTreeMap<String, MonthlyKpi>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key() {
        let line = TxnLine {
            date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            amount: 100.0,
            account_number: "40100".to_string(),
            account_name: "Ventes".to_string(),
            source: LineSource::JournalEntry,
            entity: None,
        };
        assert_eq!(line.month_key(), "2026-03");
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = Snapshot {
            fetched_at: "2026-08-06T12:00:00Z".to_string(),
            start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            lines: vec![TxnLine {
                date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
                amount: -42.5,
                account_number: "51025-3".to_string(),
                account_name: "Condiments".to_string(),
                source: LineSource::Purchase,
                entity: Some("HULL".to_string()),
            }],
            prior_lines: vec![],
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let loaded: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.lines.len(), 1);
        assert_eq!(loaded.lines[0].account_number, "51025-3");
        assert_eq!(loaded.start, snapshot.start);
    }

    #[test]
    fn test_kpi_defaults() {
        let kpi: MonthlyKpi = serde_json::from_str("{}").unwrap();
        assert_eq!(kpi.fcfp, 0.0);
        assert_eq!(kpi.numerique, 0.0);
    }
}
