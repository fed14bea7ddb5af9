use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};

use crate::client::QboClient;
use crate::error::Result;
use crate::models::{AccountInfo, LineSource, Snapshot, TxnLine};

const TXN_ORDER: &str = "TxnDate ASC, Id ASC";

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// QBO serializes amounts as numbers or strings depending on the entity.
fn extract_amount(val: &serde_json::Value) -> f64 {
    if let Some(n) = val.as_f64() {
        return n;
    }
    val.as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn parse_txn_date(entity: &serde_json::Value) -> Option<NaiveDate> {
    entity["TxnDate"]
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn ref_name(val: &serde_json::Value) -> Option<String> {
    val["name"].as_str().map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// Master data
// ---------------------------------------------------------------------------

/// Active chart of accounts, keyed by account id.
pub fn fetch_accounts(client: &mut QboClient) -> Result<HashMap<String, AccountInfo>> {
    let entities = client.query_entities("Account", "Active = true", "Id ASC")?;
    let mut map = HashMap::new();
    for entity in &entities {
        let Some(id) = entity["Id"].as_str() else {
            continue;
        };
        map.insert(
            id.to_string(),
            AccountInfo {
                name: entity["Name"].as_str().unwrap_or("").to_string(),
                number: entity["AcctNum"].as_str().unwrap_or("").to_string(),
                account_type: entity["AccountType"].as_str().unwrap_or("").to_string(),
                sub_type: entity["AccountSubType"].as_str().unwrap_or("").to_string(),
            },
        );
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Entity flattening
// ---------------------------------------------------------------------------

/// Journal entry → one line per posted line. Credit postings negate the
/// amount; lines without an account reference are skipped.
pub fn parse_journal_entry(
    entity: &serde_json::Value,
    accounts: &HashMap<String, AccountInfo>,
) -> Vec<TxnLine> {
    let Some(date) = parse_txn_date(entity) else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for line in entity["Line"].as_array().map(|a| a.as_slice()).unwrap_or(&[]) {
        let detail = &line["JournalEntryLineDetail"];
        let Some(account_id) = detail["AccountRef"]["value"].as_str() else {
            continue;
        };
        let mut amount = extract_amount(&line["Amount"]);
        if detail["PostingType"].as_str() == Some("Credit") {
            amount = -amount;
        }
        let info = accounts.get(account_id);
        lines.push(TxnLine {
            date,
            amount,
            account_number: info.map(|a| a.number.clone()).unwrap_or_default(),
            account_name: info.map(|a| a.name.clone()).unwrap_or_default(),
            source: LineSource::JournalEntry,
            entity: ref_name(&detail["Entity"]["EntityRef"]),
        });
    }
    lines
}

/// Invoice → a single sales line for its total.
pub fn parse_invoice(entity: &serde_json::Value) -> Option<TxnLine> {
    let date = parse_txn_date(entity)?;
    if entity["TotalAmt"].is_null() {
        return None;
    }
    Some(TxnLine {
        date,
        amount: extract_amount(&entity["TotalAmt"]),
        account_number: String::new(),
        account_name: "Ventes".to_string(),
        source: LineSource::Invoice,
        entity: ref_name(&entity["CustomerRef"]),
    })
}

/// Purchase → one line per account-based expense line, each categorized by
/// its own account.
pub fn parse_purchase(
    entity: &serde_json::Value,
    accounts: &HashMap<String, AccountInfo>,
) -> Vec<TxnLine> {
    let Some(date) = parse_txn_date(entity) else {
        return Vec::new();
    };
    let purchase_entity = ref_name(&entity["EntityRef"]);

    let mut lines = Vec::new();
    for line in entity["Line"].as_array().map(|a| a.as_slice()).unwrap_or(&[]) {
        let detail = &line["AccountBasedExpenseLineDetail"];
        let Some(account_id) = detail["AccountRef"]["value"].as_str() else {
            continue;
        };
        let info = accounts.get(account_id);
        lines.push(TxnLine {
            date,
            amount: extract_amount(&line["Amount"]),
            account_number: info.map(|a| a.number.clone()).unwrap_or_default(),
            account_name: info.map(|a| a.name.clone()).unwrap_or_default(),
            source: LineSource::Purchase,
            entity: purchase_entity.clone(),
        });
    }
    lines
}

// ---------------------------------------------------------------------------
// Range fetch
// ---------------------------------------------------------------------------

fn fetch_lines(
    client: &mut QboClient,
    accounts: &HashMap<String, AccountInfo>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<TxnLine>> {
    let where_clause = format!("TxnDate >= '{start}' AND TxnDate <= '{end}'");

    let mut lines = Vec::new();
    for entity in client.query_entities("JournalEntry", &where_clause, TXN_ORDER)? {
        lines.extend(parse_journal_entry(&entity, accounts));
    }
    for entity in client.query_entities("Invoice", &where_clause, TXN_ORDER)? {
        lines.extend(parse_invoice(&entity));
    }
    for entity in client.query_entities("Purchase", &where_clause, TXN_ORDER)? {
        lines.extend(parse_purchase(&entity, accounts));
    }
    Ok(lines)
}

/// Same calendar date one year earlier; Feb 29 clamps to Feb 28.
fn shift_year_back(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() - 1, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(date.year() - 1, date.month(), 28))
        .unwrap_or(date)
}

/// Fetch the full dashboard data set for [start, end]: transaction lines
/// for the range plus the same range one year back (sales growth base).
pub fn fetch_snapshot(client: &mut QboClient, start: NaiveDate, end: NaiveDate) -> Result<Snapshot> {
    let accounts = fetch_accounts(client)?;
    let lines = fetch_lines(client, &accounts, start, end)?;
    let prior_lines = fetch_lines(
        client,
        &accounts,
        shift_year_back(start),
        shift_year_back(end),
    )?;

    Ok(Snapshot {
        fetched_at: Utc::now().to_rfc3339(),
        start,
        end,
        lines,
        prior_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn accounts() -> HashMap<String, AccountInfo> {
        let mut map = HashMap::new();
        map.insert(
            "35".to_string(),
            AccountInfo {
                name: "Ventes restaurant".to_string(),
                number: "40100".to_string(),
                account_type: "Income".to_string(),
                sub_type: "SalesOfProductIncome".to_string(),
            },
        );
        map.insert(
            "51".to_string(),
            AccountInfo {
                name: "Condiments".to_string(),
                number: "51025-3".to_string(),
                account_type: "CostOfGoodsSold".to_string(),
                sub_type: "SuppliesMaterialsCogs".to_string(),
            },
        );
        map
    }

    #[test]
    fn test_extract_amount() {
        assert_eq!(extract_amount(&serde_json::json!(12.5)), 12.5);
        assert_eq!(extract_amount(&serde_json::json!("99.25")), 99.25);
        assert_eq!(extract_amount(&serde_json::json!(null)), 0.0);
        assert_eq!(extract_amount(&serde_json::json!("junk")), 0.0);
    }

    #[test]
    fn test_parse_journal_entry_signs_by_posting_type() {
        let entity = serde_json::json!({
            "Id": "9",
            "TxnDate": "2026-01-15",
            "Line": [
                {
                    "Amount": 100.0,
                    "JournalEntryLineDetail": {
                        "PostingType": "Debit",
                        "AccountRef": { "value": "51" }
                    }
                },
                {
                    "Amount": 100.0,
                    "JournalEntryLineDetail": {
                        "PostingType": "Credit",
                        "AccountRef": { "value": "35" }
                    }
                }
            ]
        });
        let lines = parse_journal_entry(&entity, &accounts());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].amount, 100.0);
        assert_eq!(lines[0].account_number, "51025-3");
        assert_eq!(lines[1].amount, -100.0);
        assert_eq!(lines[1].account_number, "40100");
    }

    #[test]
    fn test_parse_journal_entry_skips_lines_without_account() {
        let entity = serde_json::json!({
            "TxnDate": "2026-01-15",
            "Line": [
                { "Amount": 50.0, "Description": "memo only" },
                {
                    "Amount": 25.0,
                    "JournalEntryLineDetail": {
                        "PostingType": "Debit",
                        "AccountRef": { "value": "51" },
                        "Entity": { "EntityRef": { "value": "7", "name": "HULL" } }
                    }
                }
            ]
        });
        let lines = parse_journal_entry(&entity, &accounts());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].entity.as_deref(), Some("HULL"));
    }

    #[test]
    fn test_parse_journal_entry_unknown_account_keeps_line() {
        let entity = serde_json::json!({
            "TxnDate": "2026-01-15",
            "Line": [{
                "Amount": 10.0,
                "JournalEntryLineDetail": {
                    "PostingType": "Debit",
                    "AccountRef": { "value": "no-such-id" }
                }
            }]
        });
        let lines = parse_journal_entry(&entity, &accounts());
        assert_eq!(lines.len(), 1);
        // Empty number degrades to the Uncategorized bucket downstream.
        assert_eq!(lines[0].account_number, "");
    }

    #[test]
    fn test_parse_invoice() {
        let entity = serde_json::json!({
            "Id": "12",
            "TxnDate": "2026-02-03",
            "TotalAmt": 1250.0,
            "CustomerRef": { "value": "3", "name": "GATINEAU" }
        });
        let line = parse_invoice(&entity).unwrap();
        assert_eq!(line.amount, 1250.0);
        assert_eq!(line.source, LineSource::Invoice);
        assert_eq!(line.entity.as_deref(), Some("GATINEAU"));
    }

    #[test]
    fn test_parse_invoice_without_total_dropped() {
        let entity = serde_json::json!({ "TxnDate": "2026-02-03" });
        assert!(parse_invoice(&entity).is_none());
    }

    #[test]
    fn test_parse_purchase_flattens_expense_lines() {
        let entity = serde_json::json!({
            "Id": "88",
            "TxnDate": "2026-03-11",
            "TotalAmt": 75.0,
            "EntityRef": { "value": "9", "name": "OTTAWA" },
            "Line": [
                {
                    "Amount": 60.0,
                    "AccountBasedExpenseLineDetail": { "AccountRef": { "value": "51" } }
                },
                {
                    "Amount": 15.0,
                    "AccountBasedExpenseLineDetail": { "AccountRef": { "value": "35" } }
                },
                { "Amount": 5.0, "ItemBasedExpenseLineDetail": {} }
            ]
        });
        let lines = parse_purchase(&entity, &accounts());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].amount, 60.0);
        assert_eq!(lines[0].account_number, "51025-3");
        assert_eq!(lines[1].account_number, "40100");
        assert!(lines.iter().all(|l| l.entity.as_deref() == Some("OTTAWA")));
    }

    #[test]
    fn test_shift_year_back() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(shift_year_back(date), NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(shift_year_back(leap), NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
    }

    #[test]
    fn test_fetch_snapshot_covers_both_ranges() {
        let server = MockServer::start();
        // One catch-all mock: each query reads only its own entity key from
        // the response, so a combined body serves every request.
        server.mock(|when, then| {
            when.method(GET).path("/v3/company/realm_123/query");
            then.status(200).json_body(serde_json::json!({
                "QueryResponse": {
                    "Account": [
                        { "Id": "35", "Name": "Ventes", "AcctNum": "40100", "AccountType": "Income" }
                    ],
                    "JournalEntry": [{
                        "TxnDate": "2026-01-15",
                        "Line": [{
                            "Amount": 300.0,
                            "JournalEntryLineDetail": {
                                "PostingType": "Debit",
                                "AccountRef": { "value": "35" }
                            }
                        }]
                    }],
                    "Invoice": [
                        { "TxnDate": "2026-01-20", "TotalAmt": 500.0 }
                    ],
                    "Purchase": []
                }
            }));
        });

        let mut client =
            QboClient::with_base_url("tok".into(), "realm_123".into(), server.base_url());
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let snapshot = fetch_snapshot(&mut client, start, end).unwrap();

        assert_eq!(snapshot.start, start);
        assert_eq!(snapshot.end, end);
        // Current and prior-year ranges both produced the same mocked lines.
        assert_eq!(snapshot.lines.len(), 2);
        assert_eq!(snapshot.prior_lines.len(), 2);
        assert_eq!(snapshot.lines[0].account_number, "40100");
    }
}
