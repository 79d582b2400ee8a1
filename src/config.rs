//! Settings for the attendance register.
//!
//! Settings are layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. The `config` file (`config.toml`, `config.json`, ...) in the working directory, or the file
//!    passed explicitly
//! 3. Environment variables prefixed with `ATTENDANCE__`, e.g. `ATTENDANCE__SEED=7`, including
//!    any set in a `.env` file

use crate::error::{AttendanceError, Result};
use crate::metrics::{DEFAULT_CHART_LIMIT, DEFAULTER_THRESHOLD};
use crate::mock::DEFAULT_ROSTER_SIZE;
use crate::models::Subject;

use config::{Config, ConfigError, Environment, File};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base name of the optional settings file.
const CONFIG_FILE_NAME: &str = "config";

const ENV_PREFIX: &str = "ATTENDANCE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// CSV or JSON roster file. When unset, a mock roster is generated from `seed`.
    pub roster_path: Option<PathBuf>,
    /// Seed for mock rosters and initial session marks.
    pub seed: u64,
    /// Number of students in a mock roster.
    pub roster_size: usize,
    /// Students below this historical percentage are defaulters.
    pub defaulter_threshold: u8,
    /// Number of students in the aggregate chart.
    pub chart_limit: usize,
    pub default_subject: String,
    pub subjects: Vec<Subject>,
    /// Directory exports are written to.
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roster_path: None,
            seed: 42,
            roster_size: DEFAULT_ROSTER_SIZE,
            defaulter_threshold: DEFAULTER_THRESHOLD,
            chart_limit: DEFAULT_CHART_LIMIT,
            default_subject: "CS101".to_string(),
            subjects: vec![
                Subject::new("CS101", "Data Structures"),
                Subject::new("CS102", "Operating Systems"),
                Subject::new("CS103", "DBMS"),
            ],
            export_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Loads settings from the given file (which must exist) or from the optional default file,
    /// then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE_NAME).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings no dashboard could run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(AttendanceError::Config(ConfigError::Message(message)));

        if self.defaulter_threshold > 100 {
            return invalid(format!(
                "defaulter_threshold must be at most 100, got {}",
                self.defaulter_threshold
            ));
        }
        if self.chart_limit == 0 {
            return invalid("chart_limit must be greater than 0".to_string());
        }
        if self.subjects.is_empty() {
            return invalid("at least one subject must be configured".to_string());
        }
        if self.subject(&self.default_subject).is_none() {
            return invalid(format!(
                "default_subject '{}' is not in the subject list",
                self.default_subject
            ));
        }
        Ok(())
    }

    /// Looks up a subject in the catalogue by code.
    pub fn subject(&self, code: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.code == code)
    }

    /// Like [`Settings::subject`], failing for codes outside the catalogue.
    pub fn require_subject(&self, code: &str) -> Result<&Subject> {
        self.subject(code)
            .ok_or_else(|| AttendanceError::UnknownSubject(code.to_string()))
    }
}
