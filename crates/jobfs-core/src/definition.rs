use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{JobfsError, Result};

/// A validated job definition. Immutable after construction; `name` is
/// unique across the running daemon (enforced by the registry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Word characters only: `[A-Za-z0-9_]+`.
    pub name: String,
    /// Cron expression, kept verbatim for display.
    pub schedule: String,
    /// Passed as-is to `/bin/bash -c`.
    pub command: String,
}

impl JobDefinition {
    /// Validate the components and build a definition.
    pub fn new(name: &str, schedule: &str, command: &str) -> Result<Self> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(JobfsError::InvalidDefinition(format!(
                "invalid job name: {name:?}"
            )));
        }
        cron_schedule(schedule)?;
        Ok(Self {
            name: name.to_string(),
            schedule: schedule.to_string(),
            command: command.to_string(),
        })
    }

    /// Parse a `name:schedule:command` definition line.
    ///
    /// The line must split on `:` into exactly three fields; a command
    /// containing colons is rejected rather than guessed at.
    pub fn parse(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() != 3 {
            return Err(JobfsError::InvalidDefinition(format!(
                "expected name:schedule:command, got {line:?}"
            )));
        }
        Self::new(parts[0], parts[1], parts[2])
    }
}

impl fmt::Display for JobDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.schedule, self.command)
    }
}

/// Parse a cron expression, accepting both the standard 5-field form and
/// the seconds-bearing 6/7-field form the `cron` crate expects.
///
/// A 5-field expression fires at second zero of each matching minute.
pub fn cron_schedule(expr: &str) -> Result<cron::Schedule> {
    let expr = expr.trim();
    let normalized;
    let source = if expr.split_whitespace().count() == 5 {
        normalized = format!("0 {expr}");
        normalized.as_str()
    } else {
        expr
    };
    cron::Schedule::from_str(source)
        .map_err(|e| JobfsError::InvalidDefinition(format!("invalid schedule {expr:?}: {e}")))
}
