//! Chart of accounts loading.

use std::path::Path;

use anyhow::Context;
use contabil_core::ledger::{InMemoryAccountRegistry, NewAccount};
use tracing::{info, warn};

/// Builds the registry from the configured chart file, or an empty one.
pub fn load(path: Option<&str>) -> anyhow::Result<InMemoryAccountRegistry> {
    let Some(path) = path else {
        warn!("No ledger.chart_path configured, starting with an empty chart");
        return Ok(InMemoryAccountRegistry::new());
    };

    let registry = from_file(Path::new(path))?;
    info!(path, accounts = registry.len(), "Chart of accounts loaded");
    Ok(registry)
}

fn from_file(path: &Path) -> anyhow::Result<InMemoryAccountRegistry> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chart of accounts from {}", path.display()))?;
    let accounts: Vec<NewAccount> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse chart of accounts in {}", path.display()))?;
    InMemoryAccountRegistry::from_chart(accounts)
        .with_context(|| format!("Invalid chart of accounts in {}", path.display()))
}
