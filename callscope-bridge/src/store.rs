//! JSON persistence for analyzed insights.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::BridgeResult;
use crate::insight::LlmCallInsight;

/// Write `insights` as pretty-printed JSON, creating parent directories.
pub fn save_insights(path: &Path, insights: &[LlmCallInsight]) -> BridgeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(insights)?;
    fs::write(path, json)?;
    log::info!("Saved {} insights to {}", insights.len(), path.display());
    Ok(())
}

/// Load saved insights. A missing or unreadable file yields an empty list.
pub fn load_insights(path: &Path) -> Vec<LlmCallInsight> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            log::warn!("Failed to read insights from {}: {e}", path.display());
            return Vec::new();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        log::warn!("Ignoring corrupt insights file {}: {e}", path.display());
        Vec::new()
    })
}
