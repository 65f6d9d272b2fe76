//! The four live files inside a job's directory. Each holds a shared
//! reference to its job; a job never references its nodes, so joint
//! ownership by the registry map and the node contents forms no cycle.

use std::sync::Arc;

use async_trait::async_trait;

use jobfs_core::{JobfsError, Result};
use jobfs_scheduler::{Job, JobState};
use jobfs_tree::FileContent;

/// `ctl` — reads the current state, writes drive start/stop.
pub struct CtlFile {
    job: Arc<Job>,
}

impl CtlFile {
    pub fn new(job: &Arc<Job>) -> Self {
        Self {
            job: Arc::clone(job),
        }
    }
}

#[async_trait]
impl FileContent for CtlFile {
    async fn read(&self) -> Vec<u8> {
        self.job.state().to_string().into_bytes()
    }

    async fn write(&self, data: &[u8]) -> Result<usize> {
        let payload = std::str::from_utf8(data).map_err(|_| {
            JobfsError::UnknownCommand(String::from_utf8_lossy(data).into_owned())
        })?;
        Arc::clone(&self.job).control(payload).await?;
        Ok(data.len())
    }
}

/// `schedule` — the cron expression, plus the next fire instant while the
/// job is started.
pub struct ScheduleFile {
    job: Arc<Job>,
}

impl ScheduleFile {
    pub fn new(job: &Arc<Job>) -> Self {
        Self {
            job: Arc::clone(job),
        }
    }
}

#[async_trait]
impl FileContent for ScheduleFile {
    async fn read(&self) -> Vec<u8> {
        let expr = &self.job.definition().schedule;
        match (self.job.state(), self.job.next_fire()) {
            (JobState::Started, Some(next)) => {
                format!("{expr}:{}", next.to_rfc3339()).into_bytes()
            }
            _ => expr.clone().into_bytes(),
        }
    }

    async fn write(&self, _data: &[u8]) -> Result<usize> {
        Err(JobfsError::PermissionDenied)
    }
}

/// `cmd` — the command text, verbatim.
pub struct CmdFile {
    job: Arc<Job>,
}

impl CmdFile {
    pub fn new(job: &Arc<Job>) -> Self {
        Self {
            job: Arc::clone(job),
        }
    }
}

#[async_trait]
impl FileContent for CmdFile {
    async fn read(&self) -> Vec<u8> {
        self.job.definition().command.clone().into_bytes()
    }

    async fn write(&self, _data: &[u8]) -> Result<usize> {
        Err(JobfsError::PermissionDenied)
    }
}

/// `log` — the execution history, oldest entry first.
pub struct LogFile {
    job: Arc<Job>,
}

impl LogFile {
    pub fn new(job: &Arc<Job>) -> Self {
        Self {
            job: Arc::clone(job),
        }
    }
}

#[async_trait]
impl FileContent for LogFile {
    async fn read(&self) -> Vec<u8> {
        self.job.history_snapshot().concat().into_bytes()
    }

    async fn write(&self, _data: &[u8]) -> Result<usize> {
        Err(JobfsError::PermissionDenied)
    }
}
