//! `jobfs-scheduler` — per-job scheduling on the Tokio runtime.
//!
//! A [`Job`] owns its immutable definition, a two-state lifecycle
//! (stopped/started), a capacity-bounded execution [`history::History`],
//! and — while started — a scheduler task. The task sleeps until the
//! cron expression's next fire, runs the job's command through
//! [`runner::run`], records the output, and loops until cancelled.

pub mod error;
pub mod history;
pub mod job;
pub mod runner;

pub use error::{Result, SchedulerError};
pub use history::{History, HISTORY_CAPACITY};
pub use job::{Job, JobState};
