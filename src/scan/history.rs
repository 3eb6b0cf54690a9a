use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::errors::ReticleResult;
use crate::geometry::Rect;

/// One non-empty scan result, as written to the session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub ts: i64,
    pub payload: String,
    /// Viewport-space highlight region at the time of the scan.
    pub region: Rect,
}

pub struct ScanHistory {
    pub session_id: String,
    entries: Vec<ScanRecord>,
    file_path: std::path::PathBuf,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::in_dir(data_dir_or_cwd())
    }

    /// Log into an explicit directory instead of the platform data dir.
    pub fn in_dir(dir: std::path::PathBuf) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        let file_path = dir.join(format!("session_{session_id}.jsonl"));
        Self {
            session_id,
            entries: Vec::new(),
            file_path,
        }
    }

    pub fn push(&mut self, record: ScanRecord) {
        self.entries.push(record);
    }

    /// Append the records accumulated since the previous flush to the JSONL
    /// file, oldest first, and drop them from memory once written. A failed
    /// write keeps them buffered.
    pub fn flush(&mut self) -> ReticleResult<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        for record in &self.entries {
            writeln!(file, "{}", serde_json::to_string(record)?)?;
        }
        tracing::debug!(
            path = %self.file_path.display(),
            records = self.entries.len(),
            "scan records flushed"
        );
        self.entries.clear();
        Ok(())
    }

    /// Records buffered and not yet flushed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `%LOCALAPPDATA%\reticle\sessions` on Windows,
/// `~/.local/share/reticle/sessions` on Linux/macOS,
/// falling back to the current working directory.
fn data_dir_or_cwd() -> std::path::PathBuf {
    #[cfg(target_os = "windows")]
    let base = std::env::var("LOCALAPPDATA").ok().map(std::path::PathBuf::from);

    #[cfg(not(target_os = "windows"))]
    let base = std::env::var("HOME")
        .ok()
        .map(|h| std::path::PathBuf::from(h).join(".local").join("share"));

    if let Some(data_dir) = base {
        let d = data_dir.join("reticle").join("sessions");
        let _ = std::fs::create_dir_all(&d);
        return d;
    }
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."))
}
