use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use jobfs_core::{JobfsError, Result};
use jobfs_tree::FileContent;

use crate::defs::DefinitionsLog;
use crate::jobs::{self, Persist};
use crate::registry::JobRegistry;

/// `/clone` — the conventional allocation file: writing a
/// `name:schedule:command` line creates a new job subtree under `/jobs`.
/// Reads yield nothing. Concurrent writes serialise through the root
/// directory's mutex.
pub struct CloneFile {
    registry: Arc<JobRegistry>,
    definitions: Arc<DefinitionsLog>,
}

impl CloneFile {
    pub fn new(registry: Arc<JobRegistry>, definitions: Arc<DefinitionsLog>) -> Self {
        Self {
            registry,
            definitions,
        }
    }
}

#[async_trait]
impl FileContent for CloneFile {
    async fn read(&self) -> Vec<u8> {
        Vec::new()
    }

    async fn write(&self, data: &[u8]) -> Result<usize> {
        let line = std::str::from_utf8(data)
            .map_err(|e| JobfsError::InvalidDefinition(format!("definition is not UTF-8: {e}")))?;
        debug!(%line, "clone write");
        jobs::create(&self.registry, &self.definitions, line, Persist::Append).await?;
        Ok(data.len())
    }
}
