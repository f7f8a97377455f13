use std::io::ErrorKind;
use std::path::Path;

use iw_core::{ReadingHistory, ReadingHistoryEntry, Result};
use tracing::debug;

/// Reads a locally persisted history. A missing file is an empty history.
pub async fn load(path: &Path, max_len: usize) -> Result<ReadingHistory> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no history at {}, starting empty", path.display());
            return ReadingHistory::new(max_len);
        }
        Err(e) => return Err(e.into()),
    };
    let entries: Vec<ReadingHistoryEntry> = serde_json::from_slice(&raw)?;
    ReadingHistory::from_entries(entries, max_len)
}

pub async fn save(path: &Path, history: &ReadingHistory) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let raw = serde_json::to_vec_pretty(history)?;
    tokio::fs::write(path, raw).await?;
    Ok(())
}
