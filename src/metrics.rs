//! Derived views over the roster and the attendance table.
//!
//! Nothing here is stored; every function recomputes from its inputs when called.

use crate::models::{AttendanceKey, Student};
use crate::roster::Roster;
use crate::store::AttendanceStore;

use serde::Serialize;
use tabled::Tabled;

/// Students whose historical percentage is below this are defaulters.
pub const DEFAULTER_THRESHOLD: u8 = 75;

/// The number of students shown in the aggregate chart by default.
pub const DEFAULT_CHART_LIMIT: usize = 10;

/// Students whose historical percentage is below [`DEFAULTER_THRESHOLD`].
pub fn defaulters(roster: &Roster) -> Vec<&Student> {
    defaulters_with_threshold(roster, DEFAULTER_THRESHOLD)
}

/// Students whose historical percentage is strictly below `threshold`, in roster order.
pub fn defaulters_with_threshold(roster: &Roster, threshold: u8) -> Vec<&Student> {
    roster
        .iter()
        .filter(|student| student.percent < threshold)
        .collect()
}

/// One bar of the aggregate attendance chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct BarPoint {
    #[tabled(rename = "Student")]
    pub label: String,
    #[tabled(rename = "Attendance %")]
    pub percent: u8,
}

/// The first `limit` students in roster order, labelled by first name.
pub fn aggregate_bar_series(roster: &Roster, limit: usize) -> Vec<BarPoint> {
    roster
        .iter()
        .take(limit)
        .map(|student| BarPoint {
            label: student.first_name().to_string(),
            percent: student.percent,
        })
        .collect()
}

/// Present and absent counts for one session. The two always sum to the roster size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresentAbsentSplit {
    pub present: usize,
    pub absent: usize,
}

impl PresentAbsentSplit {
    pub fn total(&self) -> usize {
        self.present + self.absent
    }
}

pub fn present_absent_split(store: &AttendanceStore, key: &AttendanceKey) -> PresentAbsentSplit {
    let present = store.present_count(key);
    PresentAbsentSplit {
        present,
        absent: store.roster().len() - present,
    }
}

/// The labelled slices of the present/absent pie chart.
pub fn pie_series(split: PresentAbsentSplit) -> [(&'static str, usize); 2] {
    [("Present", split.present), ("Absent", split.absent)]
}
