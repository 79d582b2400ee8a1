//! The attendance store: the roster plus a sparse table of per-session marks.

use crate::error::{AttendanceError, Result};
use crate::models::{AttendanceKey, AttendanceRecord, Status, Student};
use crate::roster::Roster;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

static EMPTY_RECORD: LazyLock<AttendanceRecord> = LazyLock::new(AttendanceRecord::new);

/// The single source of truth for who was present or absent in each session.
///
/// The roster is fixed for the lifetime of the store. Sessions are added the first time they are
/// written and are never pruned, so switching between keys never loses earlier marks.
///
/// The store is single-threaded. Sharing it between concurrent editors would need per-key locking
/// so that [`AttendanceStore::mark_all_present`] is serialized against per-roll edits.
#[derive(Debug, Clone)]
pub struct AttendanceStore {
    roster: Roster,
    table: HashMap<AttendanceKey, AttendanceRecord>,
}

impl AttendanceStore {
    /// Creates a store with an empty attendance table.
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            table: HashMap::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Returns the explicit marks for `key`, or an empty record if the session was never written.
    ///
    /// Reading never adds the session to the table.
    pub fn get_record(&self, key: &AttendanceKey) -> &AttendanceRecord {
        self.table.get(key).unwrap_or(&EMPTY_RECORD)
    }

    /// Returns the status of `roll` for `key`, treating anything never marked as absent.
    pub fn status_of(&self, key: &AttendanceKey, roll: &str) -> Status {
        self.table
            .get(key)
            .and_then(|record| record.get(roll))
            .unwrap_or(Status::Absent)
    }

    /// Sets or overwrites a single student's status for `key`.
    pub fn set_status(&mut self, key: &AttendanceKey, roll: &str, status: Status) -> Result<()> {
        self.ensure_on_roster(roll, status)?;

        debug!(session = %key, roll, status = status.as_str(), "set status");
        self.record_mut(key).set(roll, status);
        Ok(())
    }

    /// Like [`AttendanceStore::set_status`], parsing the status from text first.
    pub fn set_status_str(&mut self, key: &AttendanceKey, roll: &str, status: &str) -> Result<()> {
        let status = Status::from_str(status)?;
        self.set_status(key, roll, status)
    }

    /// For a given session, marks all of the given students with `status`.
    ///
    /// If any roll is not on the roster the whole call is rejected and nothing is written.
    /// Returns the number of distinct students marked.
    pub fn mark(&mut self, key: &AttendanceKey, rolls: &[&str], status: Status) -> Result<usize> {
        for roll in rolls {
            self.ensure_on_roster(roll, status)?;
        }

        let distinct: HashSet<&str> = rolls.iter().copied().collect();
        let record = self.record_mut(key);
        for roll in &distinct {
            record.set(*roll, status);
        }

        debug!(session = %key, count = distinct.len(), status = status.as_str(), "marked students");
        Ok(distinct.len())
    }

    /// Marks every roster member present for `key`, replacing any existing marks for that session.
    pub fn mark_all_present(&mut self, key: &AttendanceKey) {
        let record: AttendanceRecord = self
            .roster
            .rolls()
            .map(|roll| (roll.to_string(), Status::Present))
            .collect();

        debug!(session = %key, count = record.len(), "marked all present");
        self.table.insert(key.clone(), record);
    }

    /// Installs initial marks for `key`, replacing anything already recorded for it.
    pub fn seed_session(&mut self, key: &AttendanceKey, record: AttendanceRecord) -> Result<()> {
        if let Some((roll, _)) = record.iter().find(|(roll, _)| !self.roster.contains(roll)) {
            return Err(AttendanceError::unknown_student(roll.as_str()));
        }

        debug!(session = %key, marks = record.len(), "seeded session");
        self.table.insert(key.clone(), record);
        Ok(())
    }

    /// Clears every explicit mark for `key`, so the whole roster reverts to absent.
    ///
    /// The session stays known to the store.
    pub fn reset_session(&mut self, key: &AttendanceKey) {
        debug!(session = %key, "reset session");
        self.table.insert(key.clone(), AttendanceRecord::new());
    }

    /// Whether `key` has ever been written.
    pub fn has_session(&self, key: &AttendanceKey) -> bool {
        self.table.contains_key(key)
    }

    /// Every recorded session, ordered by date and then subject.
    pub fn sessions(&self) -> Vec<&AttendanceKey> {
        self.sessions_matching(None, None)
    }

    /// Recorded sessions on `date` and for `subject`, where `None` matches anything.
    pub fn sessions_matching(
        &self,
        date: Option<NaiveDate>,
        subject: Option<&str>,
    ) -> Vec<&AttendanceKey> {
        let mut keys: Vec<_> = self
            .table
            .keys()
            .filter(|key| date.is_none_or(|d| key.date == d))
            .filter(|key| subject.is_none_or(|s| key.subject == s))
            .collect();
        keys.sort();
        keys
    }

    /// The number of roster members present for `key`.
    pub fn present_count(&self, key: &AttendanceKey) -> usize {
        self.roster
            .rolls()
            .filter(|roll| self.status_of(key, roll).is_present())
            .count()
    }

    /// The number of roster members absent for `key`, including everyone never marked.
    pub fn absent_count(&self, key: &AttendanceKey) -> usize {
        self.roster.len() - self.present_count(key)
    }

    /// The register for `key` in roster order, narrowed by `filter`.
    ///
    /// Row positions are 1-based within the filtered view.
    pub fn register(&self, key: &AttendanceKey, filter: RegisterFilter) -> Vec<RegisterRow<'_>> {
        self.roster
            .iter()
            .map(|student| (student, self.status_of(key, &student.roll)))
            .filter(|(_, status)| filter.matches(*status))
            .enumerate()
            .map(|(idx, (student, status))| RegisterRow {
                position: idx + 1,
                student,
                status,
            })
            .collect()
    }

    /// A student's attendance over every recorded session.
    ///
    /// Sessions where the student was never marked count as absences.
    pub fn student_summary(&self, roll: &str) -> Result<StudentSummary> {
        let student = self.roster.get(roll)?;

        let total = self.table.len();
        let present = self
            .table
            .keys()
            .filter(|key| self.status_of(key, roll).is_present())
            .count();

        let percent = if total > 0 {
            (present as f64 / total as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Ok(StudentSummary {
            roll: student.roll.clone(),
            name: student.name.clone(),
            present,
            total,
            percent,
        })
    }

    /// Class-level counts for the sessions on `date`, optionally narrowed to one subject.
    pub fn session_stats(&self, date: NaiveDate, subject: Option<&str>) -> SessionStats {
        let sessions = self.sessions_matching(Some(date), subject);

        let present: usize = sessions.iter().map(|key| self.present_count(key)).sum();
        let total_records = sessions.len() * self.roster.len();

        SessionStats {
            date,
            subject: subject.map(str::to_string),
            total_records,
            present,
            absent: total_records - present,
        }
    }

    fn ensure_on_roster(&self, roll: &str, status: Status) -> Result<()> {
        if self.roster.contains(roll) {
            Ok(())
        } else {
            warn!(roll, status = status.as_str(), "tried to mark an unknown student");
            Err(AttendanceError::unknown_student(roll))
        }
    }

    fn record_mut(&mut self, key: &AttendanceKey) -> &mut AttendanceRecord {
        self.table.entry(key.clone()).or_default()
    }
}

/// Which rows of the register to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterFilter {
    #[default]
    All,
    Present,
    Absent,
}

impl RegisterFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            RegisterFilter::All => true,
            RegisterFilter::Present => status == Status::Present,
            RegisterFilter::Absent => status == Status::Absent,
        }
    }
}

impl FromStr for RegisterFilter {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(RegisterFilter::All),
            other => Status::from_str(other).map(|status| match status {
                Status::Present => RegisterFilter::Present,
                Status::Absent => RegisterFilter::Absent,
            }),
        }
    }
}

/// One line of the register.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterRow<'a> {
    pub position: usize,
    pub student: &'a Student,
    pub status: Status,
}

/// A student's attendance across all recorded sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub roll: String,
    pub name: String,
    pub present: usize,
    pub total: usize,
    /// Rounded to two decimal places; `0.0` when no sessions exist.
    pub percent: f64,
}

/// Aggregate counts for the sessions on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub date: NaiveDate,
    pub subject: Option<String>,
    pub total_records: usize,
    pub present: usize,
    pub absent: usize,
}
