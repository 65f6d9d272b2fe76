use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use jobfs_core::Result;

use crate::jobs::{self, Persist};
use crate::registry::JobRegistry;

/// Append-only definitions log: one `name:schedule:command` line per
/// successfully created job, written verbatim.
pub struct DefinitionsLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl DefinitionsLog {
    /// Open the log for append, creating it (and its parent directory)
    /// if absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one definition line and flush it to disk.
    pub async fn append(&self, line: &str) -> Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(format!("{line}\n").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Every non-empty line currently in the log, in file order.
    pub async fn lines(&self) -> Result<Vec<String>> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Replay the log through the shared creation path. Lines that fail
/// validation (or duplicate an earlier line) are logged and skipped;
/// replay continues. Restored jobs start out stopped.
pub async fn replay(registry: &JobRegistry, definitions: &DefinitionsLog) -> Result<usize> {
    let mut restored = 0;
    for line in definitions.lines().await? {
        match jobs::create(registry, definitions, &line, Persist::Skip).await {
            Ok(_) => restored += 1,
            Err(e) => warn!(%line, error = %e, "skipping definition during replay"),
        }
    }
    info!(count = restored, "definitions replayed");
    Ok(restored)
}
