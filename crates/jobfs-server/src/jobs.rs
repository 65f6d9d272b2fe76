use std::sync::Arc;

use tracing::info;

use jobfs_core::{JobDefinition, JobfsError, Result};
use jobfs_scheduler::Job;

use crate::defs::DefinitionsLog;
use crate::registry::JobRegistry;

/// Whether a created job is persisted to the definitions log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persist {
    Append,
    Skip,
}

/// The single creation path. Every job — from a `/clone` write or a
/// replayed log line — passes through here; no caller can bypass the log.
///
/// With `Persist::Append` the raw line is appended (and flushed) before
/// registration, so a failed append leaves both the log and the registry
/// unchanged.
pub async fn create(
    registry: &JobRegistry,
    definitions: &DefinitionsLog,
    line: &str,
    persist: Persist,
) -> Result<Arc<Job>> {
    let definition = JobDefinition::parse(line)?;
    if registry.contains(&definition.name) {
        return Err(JobfsError::DuplicateName {
            name: definition.name,
        });
    }
    if persist == Persist::Append {
        definitions.append(line).await?;
    }
    let job = registry.add_job(definition)?;
    info!(job = %job.definition().name, "job created");
    Ok(job)
}
