use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_file_exists, shellexpand_path, Settings};

pub fn run(data_dir: Option<String>, environment: Option<String>) -> Result<()> {
    let mut settings = if settings_file_exists() {
        load_settings()
    } else {
        Settings::default()
    };

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(env) = environment {
        settings.environment = env;
    }

    let data_dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    std::fs::create_dir_all(data_dir.join("exports"))?;
    save_settings(&settings)?;

    println!("Objectif initialized.");
    println!("  Data dir:     {}", data_dir.display());
    println!("  Environment:  {}", settings.environment);
    println!("  Restaurants:  {}", settings.restaurants.join(", "));
    println!();
    println!("Try these next:");
    println!("  objectif demo        # explore with sample data");
    println!("  objectif connect     # or connect to QuickBooks");
    println!("  objectif report");

    Ok(())
}
