//! Seedable mock data for demos and tests.
//!
//! The roster and initial attendance used when no roster provider is configured come from a
//! [`MockSource`], so the same seed always yields the same dashboard.

use crate::error::Result;
use crate::models::{AttendanceRecord, Status, Student};
use crate::roster::Roster;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NAMES: [&str; 18] = [
    "Amit Patil",
    "Riya Sharma",
    "Suresh More",
    "Nikhil Deshmukh",
    "Ankita Rane",
    "Rohit Gaikwad",
    "Sneha Kulkarni",
    "Vivek Joshi",
    "Pooja Khatri",
    "Manish Patange",
    "Kajal More",
    "Prasad Kale",
    "Madhuri Joshi",
    "Aakash Patil",
    "Rakesh Jadhav",
    "Divya Bhosale",
    "Swapnil Pawar",
    "Tanvi Desai",
];

/// The default number of students in a mock roster.
pub const DEFAULT_ROSTER_SIZE: usize = NAMES.len();

/// Probability that a student starts a seeded session as present.
const INITIAL_PRESENT_PROBABILITY: f64 = 0.7;

/// A source of random values for mock data.
pub trait MockSource {
    /// A historical attendance percentage in `60..=99`.
    fn percent(&mut self) -> u8;

    /// The status a student starts a seeded session with.
    fn initial_status(&mut self) -> Status;
}

/// A [`MockSource`] backed by a seeded [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededMock {
    rng: StdRng,
}

impl SeededMock {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl MockSource for SeededMock {
    fn percent(&mut self) -> u8 {
        self.rng.gen_range(60..=99)
    }

    fn initial_status(&mut self) -> Status {
        if self.rng.gen_bool(INITIAL_PRESENT_PROBABILITY) {
            Status::Present
        } else {
            Status::Absent
        }
    }
}

/// Generates a roster of `count` students.
///
/// Names cycle through a fixed list, rolls count up from `CE20101`, and every student is in the
/// `Computer` department.
pub fn mock_roster<S: MockSource + ?Sized>(source: &mut S, count: usize) -> Result<Roster> {
    let students = (0..count)
        .map(|i| Student {
            id: i as u32 + 1,
            name: NAMES[i % NAMES.len()].to_string(),
            roll: format!("CE20{}", 100 + i + 1),
            dept: "Computer".to_string(),
            percent: source.percent(),
        })
        .collect();

    Roster::new(students)
}

/// Generates initial marks for one session, with an explicit status for every roster member.
pub fn mock_record<S: MockSource + ?Sized>(source: &mut S, roster: &Roster) -> AttendanceRecord {
    roster
        .rolls()
        .map(|roll| (roll.to_string(), source.initial_status()))
        .collect()
}
