pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod mock;
pub mod models;
pub mod roster;
pub mod session;
pub mod store;

pub use crate::error::{AttendanceError, Result};
pub use crate::models::{AttendanceKey, AttendanceRecord, Status, Student};
pub use crate::roster::Roster;
pub use crate::store::AttendanceStore;

use crate::config::Settings;
use crate::mock::{SeededMock, mock_roster};

/// Loads the roster named in `settings`, or generates a mock one from the configured seed.
pub fn load_roster(settings: &Settings) -> Result<Roster> {
    match &settings.roster_path {
        Some(path) => Roster::load(path),
        None => mock_roster(&mut SeededMock::new(settings.seed), settings.roster_size),
    }
}

/// Creates an empty store over the roster described by `settings`.
pub fn create_default_store(settings: &Settings) -> Result<AttendanceStore> {
    Ok(AttendanceStore::new(load_roster(settings)?))
}
