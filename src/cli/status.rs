use crate::auth::{credentials_path, load_credentials};
use crate::error::Result;
use crate::settings::{load_settings, settings_file_exists};
use crate::store::{load_kpis, load_snapshot, snapshot_path};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);

    if !settings_file_exists() {
        println!("Not initialized. Run `objectif init` to set up.");
    }
    println!("Data dir:     {}", data_dir.display());
    println!("Environment:  {}", settings.environment);
    println!("Restaurants:  {}", settings.restaurants.join(", "));

    println!();
    match load_credentials(&credentials_path(&data_dir)) {
        Ok(creds) => {
            println!("QuickBooks:   connected (realm {})", creds.realm_id);
            if let Some(expires) = creds.access_token_expires_at {
                println!("Access token expires:  {expires}");
            }
            if let Some(expires) = creds.refresh_token_expires_at {
                println!("Refresh token expires: {expires}");
            }
        }
        Err(_) => println!("QuickBooks:   not connected. Run `objectif connect`."),
    }

    println!();
    match load_snapshot(&data_dir) {
        Ok(snapshot) => {
            println!("Snapshot:     {}", snapshot_path(&data_dir).display());
            println!("  Period:     {} to {}", snapshot.start, snapshot.end);
            println!("  Fetched:    {}", snapshot.fetched_at);
            println!("  Lines:      {} (+{} prior-year)", snapshot.lines.len(), snapshot.prior_lines.len());
        }
        Err(_) => println!("Snapshot:     none. Run `objectif fetch` or `objectif demo`."),
    }

    let kpis = load_kpis(&data_dir);
    println!("KPI months:   {}", kpis.len());

    Ok(())
}
