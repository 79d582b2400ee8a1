use crate::error::{AttendanceError, Result};
use crate::models::{Roll, Student};

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// The fixed, ordered list of students for a course.
///
/// Rolls are unique and every percentage lies in `[0, 100]`. Order is preserved from the input,
/// since charts and exports follow roster order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    students: Vec<Student>,
    by_roll: HashMap<Roll, usize>,
}

impl Roster {
    /// Builds a roster, rejecting repeated rolls and out-of-range percentages.
    pub fn new(students: Vec<Student>) -> Result<Self> {
        let mut by_roll = HashMap::with_capacity(students.len());

        for (idx, student) in students.iter().enumerate() {
            if student.percent > 100 {
                return Err(AttendanceError::PercentOutOfRange {
                    roll: student.roll.clone(),
                    percent: student.percent,
                });
            }
            if by_roll.insert(student.roll.clone(), idx).is_some() {
                return Err(AttendanceError::DuplicateRoll(student.roll.clone()));
            }
        }

        debug!(students = students.len(), "built roster");
        Ok(Self { students, by_roll })
    }

    /// Loads a roster from a `.json` file, or from CSV for any other extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let roster = if is_json {
            Self::from_json_path(path)?
        } else {
            Self::from_csv_path(path)?
        };

        info!(path = %path.display(), students = roster.len(), "loaded roster");
        Ok(roster)
    }

    /// Reads a CSV roster with the header `id,name,roll,dept,percent`.
    ///
    /// `percent` must be a whole number; a fractional value fails the whole load with
    /// [`AttendanceError::Csv`].
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let students = rdr
            .deserialize::<Student>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(students)
    }

    /// Reads a JSON array of students. As with CSV, `percent` must be a whole number.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let students: Vec<Student> = serde_json::from_str(&contents)?;
        Self::new(students)
    }

    /// Writes the roster in the same CSV format [`Roster::from_csv_path`] reads.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        for student in &self.students {
            wtr.serialize(student)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Looks up a student by roll.
    pub fn get(&self, roll: &str) -> Result<&Student> {
        self.by_roll
            .get(roll)
            .map(|&idx| &self.students[idx])
            .ok_or_else(|| AttendanceError::unknown_student(roll))
    }

    pub fn contains(&self, roll: &str) -> bool {
        self.by_roll.contains_key(roll)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Students in roster order.
    pub fn iter(&self) -> std::slice::Iter<'_, Student> {
        self.students.iter()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Rolls in roster order.
    pub fn rolls(&self) -> impl Iterator<Item = &str> {
        self.students.iter().map(|student| student.roll.as_str())
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Student;
    type IntoIter = std::slice::Iter<'a, Student>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
pub(crate) fn student(id: u32, name: &str, roll: &str, percent: u8) -> Student {
    Student {
        id,
        name: name.to_string(),
        roll: roll.to_string(),
        dept: "Computer".to_string(),
        percent,
    }
}
