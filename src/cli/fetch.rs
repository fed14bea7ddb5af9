use colored::Colorize;

use crate::auth::{credentials_path, load_credentials};
use crate::client::QboClient;
use crate::error::Result;
use crate::fetcher::fetch_snapshot;
use crate::models::LineSource;
use crate::settings::{get_data_dir, load_settings};
use crate::store::{save_snapshot, snapshot_path};

pub fn run(
    quarter: Option<String>,
    year: Option<i32>,
    from_date: Option<String>,
    to_date: Option<String>,
) -> Result<()> {
    let (start, end) = super::resolve_range(
        quarter.as_deref(),
        year,
        from_date.as_deref(),
        to_date.as_deref(),
    )?;

    let settings = load_settings();
    let data_dir = get_data_dir();
    let creds_path = credentials_path(&data_dir);
    let creds = load_credentials(&creds_path)?;
    let mut client = QboClient::from_credentials(creds, creds_path, &settings.environment);

    println!("Fetching QuickBooks data {start} to {end} ({})...", settings.environment);
    let snapshot = fetch_snapshot(&mut client, start, end)?;

    let count = |source: LineSource| snapshot.lines.iter().filter(|l| l.source == source).count();
    let journal = count(LineSource::JournalEntry);
    let invoices = count(LineSource::Invoice);
    let purchases = count(LineSource::Purchase);

    save_snapshot(&snapshot, &data_dir)?;

    println!("{}", "Snapshot updated.".green());
    println!("  Journal lines:    {journal}");
    println!("  Invoice lines:    {invoices}");
    println!("  Purchase lines:   {purchases}");
    println!("  Prior-year lines: {}", snapshot.prior_lines.len());
    println!("  Saved to:         {}", snapshot_path(&data_dir).display());
    println!();
    println!("Try: objectif report");

    Ok(())
}
