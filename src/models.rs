use crate::error::{AttendanceError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// The roll number of a student, which is the join key into attendance records.
pub type Roll = String;

/// A single student on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Tabled)]
pub struct Student {
    #[tabled(rename = "ID")]
    pub id: u32,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Roll")]
    pub roll: Roll,
    #[tabled(rename = "Dept")]
    pub dept: String,
    /// Historical attendance percentage in `[0, 100]`, supplied by the roster provider.
    ///
    /// Whole numbers only: roster files with fractional values such as `82.5` are rejected when
    /// loaded. Round values like the two-decimal [`StudentSummary`] percentage before writing them
    /// to a roster.
    ///
    /// [`StudentSummary`]: crate::store::StudentSummary
    #[tabled(rename = "Attendance %")]
    pub percent: u8,
}

impl Student {
    /// The first word of the student's name, used as a short chart label.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// Whether a student attended a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Present,
    /// Also the status of every student without an explicit mark.
    #[default]
    Absent,
}

impl Status {
    /// The lowercase wire form, `present` or `absent`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Present => "present",
            Status::Absent => "absent",
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Status::Present)
    }
}

impl FromStr for Status {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Status::Present),
            "absent" => Ok(Status::Absent),
            _ => Err(AttendanceError::InvalidStatus(s.to_string())),
        }
    }
}

/// Capitalized for presentation: `Present` or `Absent`.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Present => write!(f, "Present"),
            Status::Absent => write!(f, "Absent"),
        }
    }
}

/// Identifies one attendance session by its date and subject code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttendanceKey {
    pub date: NaiveDate,
    pub subject: String,
}

impl AttendanceKey {
    pub fn new(date: NaiveDate, subject: impl Into<String>) -> Self {
        Self {
            date,
            subject: subject.into(),
        }
    }

    /// Builds a key from a `YYYY-MM-DD` date string and a subject code.
    pub fn parse(date: &str, subject: &str) -> Result<Self> {
        Ok(Self::new(parse_date(date)?, subject))
    }
}

impl fmt::Display for AttendanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.subject)
    }
}

/// Parses a session date in `YYYY-MM-DD` form.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AttendanceError::InvalidDate(date.to_string()))
}

/// The explicit marks for one session, keyed by roll.
///
/// A roll without an entry is not stored as absent; the store applies the default-absent policy
/// when it is queried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    marks: HashMap<Roll, Status>,
}

impl AttendanceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicit mark for `roll`, if one was recorded.
    pub fn get(&self, roll: &str) -> Option<Status> {
        self.marks.get(roll).copied()
    }

    /// Sets or overwrites the mark for `roll`.
    pub fn set(&mut self, roll: impl Into<Roll>, status: Status) {
        self.marks.insert(roll.into(), status);
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Roll, &Status)> {
        self.marks.iter()
    }
}

impl FromIterator<(Roll, Status)> for AttendanceRecord {
    fn from_iter<I: IntoIterator<Item = (Roll, Status)>>(iter: I) -> Self {
        Self {
            marks: iter.into_iter().collect(),
        }
    }
}

/// A subject in the course catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct Subject {
    #[tabled(rename = "Code")]
    pub code: String,
    #[tabled(rename = "Title")]
    pub title: String,
}

impl Subject {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
        }
    }
}
