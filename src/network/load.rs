use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::snapshot::NetworkSnapshot;

pub fn load_snapshot(path: &Path) -> Result<NetworkSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read network snapshot {}", path.display()))?;
    let snapshot = parse_snapshot(&raw)
        .with_context(|| format!("failed to parse network snapshot {}", path.display()))?;

    info!(
        companies = snapshot.companies.len(),
        contacts = snapshot.contacts.len(),
        relationships = snapshot.relationships.len(),
        "loaded network snapshot from {}",
        path.display()
    );
    Ok(snapshot)
}

pub fn parse_snapshot(raw: &str) -> Result<NetworkSnapshot> {
    serde_json::from_str(raw).context("invalid network snapshot JSON")
}
