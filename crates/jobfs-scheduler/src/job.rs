use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use jobfs_core::{definition::cron_schedule, JobDefinition, JobfsError};

use crate::history::History;
use crate::runner;

/// `ctl` command literals, matched case-insensitively.
pub const CMD_START: &str = "start";
pub const CMD_STOP: &str = "stop";

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Stopped,
    Started,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Stopped => write!(f, "stopped"),
            JobState::Started => write!(f, "started"),
        }
    }
}

/// The running scheduler task and its cancellation signal. Present iff
/// the job is started.
struct SchedulerTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// A named, cron-scheduled shell command with bounded execution history.
///
/// State and the scheduler handle are only mutated through [`Job::control`],
/// which the ctl file invokes under its parent directory's mutex — so
/// transitions are totally ordered per job.
pub struct Job {
    definition: JobDefinition,
    /// Parsed once at construction; the expression string in
    /// `definition` is kept verbatim for display.
    schedule: Schedule,
    state: Mutex<JobState>,
    history: Mutex<History>,
    task: tokio::sync::Mutex<Option<SchedulerTask>>,
}

impl Job {
    pub fn new(definition: JobDefinition) -> jobfs_core::Result<Self> {
        let schedule = cron_schedule(&definition.schedule)?;
        Ok(Self {
            definition,
            schedule,
            state: Mutex::new(JobState::Stopped),
            history: Mutex::new(History::default()),
            task: tokio::sync::Mutex::new(None),
        })
    }

    pub fn definition(&self) -> &JobDefinition {
        &self.definition
    }

    pub fn state(&self) -> JobState {
        *self.state.lock().unwrap()
    }

    /// Next fire instant, strictly after now.
    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        self.schedule.after(&Utc::now()).next()
    }

    /// Copy of the execution history, oldest entry first.
    pub fn history_snapshot(&self) -> Vec<String> {
        self.history.lock().unwrap().snapshot()
    }

    fn record(&self, entry: String) {
        self.history.lock().unwrap().push(entry);
    }

    /// Drive the state machine with a ctl payload: case-insensitive
    /// `start` or `stop`; anything else is `unknown-command` and leaves
    /// the state untouched.
    pub async fn control(self: Arc<Self>, payload: &str) -> jobfs_core::Result<()> {
        if payload.eq_ignore_ascii_case(CMD_START) {
            self.start().await;
            Ok(())
        } else if payload.eq_ignore_ascii_case(CMD_STOP) {
            self.stop().await;
            Ok(())
        } else {
            Err(JobfsError::UnknownCommand(payload.to_string()))
        }
    }

    /// Transition to started and spawn the scheduler task. No-op if
    /// already started.
    pub async fn start(self: Arc<Self>) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return;
        }
        self.record(format!("{}:started\n", Utc::now().to_rfc3339()));
        *self.state.lock().unwrap() = JobState::Started;

        let token = CancellationToken::new();
        let job = Arc::clone(&self);
        let task_token = token.clone();
        let handle = tokio::spawn(async move { job.run(task_token).await });
        *task = Some(SchedulerTask { token, handle });
        info!(job = %self.definition.name, "job started");
    }

    /// Signal the scheduler task and wait for it to acknowledge by
    /// exiting — its completion entry is in history before this returns.
    /// No-op if already stopped.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        let Some(scheduler) = task.take() else {
            return;
        };
        scheduler.token.cancel();
        if let Err(e) = scheduler.handle.await {
            error!(job = %self.definition.name, error = %e, "scheduler task failed");
        }
        *self.state.lock().unwrap() = JobState::Stopped;
        info!(job = %self.definition.name, "job stopped");
    }

    /// Scheduler task loop: wait for whichever comes first — the next
    /// fire instant or cancellation. The task never touches any tree
    /// mutex, so a ctl writer may block on it safely.
    async fn run(self: Arc<Self>, token: CancellationToken) {
        loop {
            let now = Utc::now();
            let Some(next) = self.schedule.after(&now).next() else {
                // Exhausted schedules leave the job started but inert;
                // make that visible through the log file.
                warn!(job = %self.definition.name, "schedule yields no further instants");
                self.record(format!("{}:schedule exhausted\n", Utc::now().to_rfc3339()));
                return;
            };
            let delay = (next - now).to_std().unwrap_or_default();

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    match runner::run(&self.definition.command).await {
                        Ok(stdout) => {
                            self.record(format!("{}:{}", Utc::now().to_rfc3339(), stdout));
                        }
                        Err(e) => {
                            error!(job = %self.definition.name, error = %e, "command failed");
                        }
                    }
                }
                _ = token.cancelled() => {
                    self.record(format!("{}:completed\n", Utc::now().to_rfc3339()));
                    return;
                }
            }
        }
    }
}
