//! Error types for the attendance register.

use thiserror::Error;

/// Everything that can go wrong while building a roster or recording attendance.
#[derive(Error, Debug)]
pub enum AttendanceError {
    /// A roll that is not on the roster was used in a mutation or lookup.
    #[error("student with roll '{roll}' is not on the roster")]
    UnknownStudent { roll: String },

    /// A status other than `present` or `absent`.
    #[error("invalid attendance status '{0}', expected 'present' or 'absent'")]
    InvalidStatus(String),

    /// Two roster entries share the same roll.
    #[error("roll '{0}' already exists on the roster")]
    DuplicateRoll(String),

    /// A roster entry carries a historical percentage outside `[0, 100]`.
    #[error("student '{roll}' has attendance percentage {percent}, expected 0 to 100")]
    PercentOutOfRange { roll: String, percent: u8 },

    /// A subject code missing from the configured catalogue.
    #[error("unknown subject '{0}'")]
    UnknownSubject(String),

    /// A subject code that cannot be part of an export file name.
    #[error("subject '{0}' cannot be used in a file name")]
    InvalidSubject(String),

    /// A session date that is not `YYYY-MM-DD`.
    #[error("invalid session date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// A specialized `Result` for attendance operations.
pub type Result<T> = std::result::Result<T, AttendanceError>;

impl AttendanceError {
    pub fn unknown_student(roll: impl Into<String>) -> Self {
        Self::UnknownStudent { roll: roll.into() }
    }

    /// Returns `true` if the error rejected a roll missing from the roster.
    #[must_use]
    pub fn is_unknown_student(&self) -> bool {
        matches!(self, Self::UnknownStudent { .. })
    }

    #[must_use]
    pub fn is_invalid_status(&self) -> bool {
        matches!(self, Self::InvalidStatus(_))
    }
}
