use thiserror::Error;

/// Errors surfaced to protocol clients or raised during daemon startup.
#[derive(Debug, Error)]
pub enum JobfsError {
    /// A definition line did not split into three fields, or its name or
    /// schedule failed validation.
    #[error("invalid job definition: {0}")]
    InvalidDefinition(String),

    /// A job (or tree node) with that name already exists.
    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    /// A `ctl` file received something other than start/stop.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Write attempted on a read-only node, or open mode not permitted.
    #[error("permission denied")]
    PermissionDenied,

    /// Walk to a non-existent path, or an unknown fid.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Underlying I/O failure (definitions log, listener).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed or unroutable request frame.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl JobfsError {
    /// Short error code string sent to clients in response frames.
    pub fn code(&self) -> &'static str {
        match self {
            JobfsError::InvalidDefinition(_) => "invalid-definition",
            JobfsError::DuplicateName { .. } => "duplicate-name",
            JobfsError::UnknownCommand(_) => "unknown-command",
            JobfsError::PermissionDenied => "permission-denied",
            JobfsError::NotFound { .. } => "not-found",
            JobfsError::Io(_) => "io-error",
            JobfsError::Config(_) => "config-error",
            JobfsError::Protocol(_) => "protocol-error",
        }
    }
}

pub type Result<T> = std::result::Result<T, JobfsError>;
