pub mod completions;
pub mod connect;
pub mod demo;
pub mod export;
pub mod fetch;
pub mod init;
pub mod kpi;
pub mod report;
pub mod status;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::aggregator::quarter_range;
use crate::error::{ObjectifError, Result};

/// Resolve the reporting period from CLI arguments: an explicit
/// `--from`/`--to` pair wins, otherwise the chosen (or current) quarter.
pub(crate) fn resolve_range(
    quarter: Option<&str>,
    year: Option<i32>,
    from_date: Option<&str>,
    to_date: Option<&str>,
) -> Result<(NaiveDate, NaiveDate)> {
    match (from_date, to_date) {
        (Some(from), Some(to)) => {
            let start = parse_date(from)?;
            let end = parse_date(to)?;
            if end < start {
                return Err(ObjectifError::InvalidDate(format!(
                    "--to {to} is before --from {from}"
                )));
            }
            return Ok((start, end));
        }
        (Some(_), None) => {
            return Err(ObjectifError::Other(
                "--from requires --to (both date boundaries must be specified)".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(ObjectifError::Other(
                "--to requires --from (both date boundaries must be specified)".to_string(),
            ));
        }
        (None, None) => {}
    }

    let today = Local::now().date_naive();
    let year = year.unwrap_or_else(|| today.year());
    let quarter = quarter
        .map(|q| q.to_string())
        .unwrap_or_else(|| format!("T{}", (today.month() - 1) / 3 + 1));
    quarter_range(&quarter, year)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ObjectifError::InvalidDate(format!("{s} (expected YYYY-MM-DD)")))
}

#[derive(Parser)]
#[command(
    name = "objectif",
    about = "Quarterly objectives dashboard CLI for restaurant franchise operators."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Objectif: choose a data directory and QuickBooks environment.
    Init {
        /// Path for Objectif data (default: ~/Documents/objectif)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// QuickBooks environment: sandbox or production
        #[arg(long, value_parser = ["sandbox", "production"])]
        environment: Option<String>,
    },
    /// Connect to QuickBooks (OAuth2 authorization-code flow).
    Connect,
    /// Fetch transactions for a quarter or date range into the snapshot.
    Fetch {
        /// Quarter: T1, T2, T3 or T4 (default: current quarter)
        #[arg(long)]
        quarter: Option<String>,
        /// Calendar year (default: current year)
        #[arg(long)]
        year: Option<i32>,
        /// Custom period start: YYYY-MM-DD (requires --to)
        #[arg(long = "from")]
        from_date: Option<String>,
        /// Custom period end: YYYY-MM-DD (requires --from)
        #[arg(long = "to")]
        to_date: Option<String>,
    },
    /// Record external KPIs (FCFP, Numérique) per month.
    Kpi {
        #[command(subcommand)]
        command: KpiCommands,
    },
    /// Render the quarterly dashboard in the terminal.
    Report {
        /// Only include lines for this restaurant
        #[arg(long)]
        restaurant: Option<String>,
    },
    /// Export the dashboard to a file.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Load a demo snapshot to explore Objectif without QuickBooks.
    Demo,
    /// Show settings, connection and snapshot status.
    Status,
    /// Generate a shell completion script.
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum KpiCommands {
    /// Record FCFP and/or Numérique for a month.
    Set {
        /// Month: YYYY-MM
        #[arg(long)]
        month: String,
        /// FCFP count from the franchise tracker
        #[arg(long)]
        fcfp: Option<f64>,
        /// Digital sales share (percent)
        #[arg(long)]
        numerique: Option<f64>,
    },
    /// List recorded KPI months.
    List,
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Write the HTML dashboard (table + SVG charts).
    Html {
        /// Only include lines for this restaurant
        #[arg(long)]
        restaurant: Option<String>,
        /// Output path (default: <data_dir>/exports/dashboard-YYYY-MM-DD.html)
        #[arg(long)]
        output: Option<String>,
    },
    /// Write monthly aggregates as CSV.
    Csv {
        /// Only include lines for this restaurant
        #[arg(long)]
        restaurant: Option<String>,
        /// Output path (default: <data_dir>/exports/dashboard-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
}
