use thiserror::Error;

/// Errors internal to the scheduling subsystem. These are logged and, where
/// applicable, recorded in job history — never propagated to protocol
/// clients.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The command could not be launched at all.
    #[error("failed to launch command: {0}")]
    Spawn(std::io::Error),

    /// The command ran but exited non-zero.
    #[error("command exited with status {code:?}")]
    NonZeroExit { code: Option<i32> },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
