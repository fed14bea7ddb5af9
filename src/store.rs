use std::path::{Path, PathBuf};

use crate::error::{ObjectifError, Result};
use crate::models::{KpiStore, Snapshot};

pub fn snapshot_path(data_dir: &Path) -> PathBuf {
    data_dir.join("snapshot.json")
}

pub fn kpi_path(data_dir: &Path) -> PathBuf {
    data_dir.join("kpi.json")
}

/// Load the last fetched snapshot.
pub fn load_snapshot(data_dir: &Path) -> Result<Snapshot> {
    let path = snapshot_path(data_dir);
    let content = std::fs::read_to_string(&path).map_err(|_| {
        ObjectifError::Other(format!(
            "no snapshot at {} — run `objectif fetch` (or `objectif demo`) first",
            path.display()
        ))
    })?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_snapshot(snapshot: &Snapshot, data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(snapshot_path(data_dir), format!("{json}\n"))?;
    Ok(())
}

/// KPI store; an absent or unreadable file is just an empty store.
pub fn load_kpis(data_dir: &Path) -> KpiStore {
    let path = kpi_path(data_dir);
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

pub fn save_kpis(kpis: &KpiStore, data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let json = serde_json::to_string_pretty(kpis)?;
    std::fs::write(kpi_path(data_dir), format!("{json}\n"))?;
    Ok(())
}
