mod aggregator;
mod auth;
mod categorizer;
mod chart;
mod cli;
mod client;
mod error;
mod fetcher;
mod fmt;
mod html;
mod models;
mod objectives;
mod settings;
mod store;

use clap::Parser;

use cli::{Cli, Commands, ExportCommands, KpiCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, environment } => cli::init::run(data_dir, environment),
        Commands::Connect => cli::connect::run(),
        Commands::Fetch {
            quarter,
            year,
            from_date,
            to_date,
        } => cli::fetch::run(quarter, year, from_date, to_date),
        Commands::Kpi { command } => match command {
            KpiCommands::Set { month, fcfp, numerique } => cli::kpi::set(&month, fcfp, numerique),
            KpiCommands::List => cli::kpi::list(),
        },
        Commands::Report { restaurant } => cli::report::run(restaurant),
        Commands::Export { command } => match command {
            ExportCommands::Html { restaurant, output } => cli::export::html(restaurant, output),
            ExportCommands::Csv { restaurant, output } => cli::export::csv(restaurant, output),
        },
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
        Commands::Completions { shell } => cli::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
