//! CSV export of a single session's register.

use crate::error::{AttendanceError, Result};
use crate::models::AttendanceKey;
use crate::store::AttendanceStore;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// The MIME type of exported files.
pub const CSV_MIME: &str = "text/csv";

/// The header row of every export.
pub const CSV_HEADER: [&str; 4] = ["Name", "Roll", "Dept", "Status"];

/// Renders the register for `key` as CSV, one row per roster member in roster order.
///
/// Status is capitalized (`Present` / `Absent`) and follows the default-absent policy. Fields
/// containing quotes, commas, or line breaks are quoted with inner quotes doubled.
pub fn to_csv(store: &AttendanceStore, key: &AttendanceKey) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADER)?;
    for student in store.roster() {
        let status = store.status_of(key, &student.roll).to_string();
        wtr.write_record([
            student.name.as_str(),
            student.roll.as_str(),
            student.dept.as_str(),
            status.as_str(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|err| {
            let inner = err.error();
            AttendanceError::Io(io::Error::new(inner.kind(), inner.to_string()))
        })?;
    String::from_utf8(bytes)
        .map_err(|err| AttendanceError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// The download name for a session: `attendance_<date>_<subject>.csv`.
///
/// Subjects that are empty, or that contain path separators or `..`, are rejected so the file
/// always lands in the export directory.
pub fn export_filename(key: &AttendanceKey) -> Result<String> {
    let subject = key.subject.as_str();
    if subject.is_empty() || subject.contains(['/', '\\', '\0']) || subject.contains("..") {
        return Err(AttendanceError::InvalidSubject(key.subject.clone()));
    }

    Ok(format!("attendance_{}_{}.csv", key.date, subject))
}

/// Writes the export for `key` into `dir` and returns the path of the new file.
pub fn write_csv(
    dir: impl AsRef<Path>,
    store: &AttendanceStore,
    key: &AttendanceKey,
) -> Result<PathBuf> {
    let path = dir.as_ref().join(export_filename(key)?);
    fs::write(&path, to_csv(store, key)?)?;

    info!(session = %key, path = %path.display(), mime = CSV_MIME, "exported attendance");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Status, Student};
    use crate::roster::{Roster, student};

    fn store() -> AttendanceStore {
        let roster = Roster::new(vec![
            student(1, "Amit Patil", "A", 80),
            Student {
                id: 2,
                name: "Riya \"Ri\" Sharma".to_string(),
                roll: "B".to_string(),
                dept: "Computer, IT".to_string(),
                percent: 74,
            },
        ])
        .unwrap();
        AttendanceStore::new(roster)
    }

    #[test]
    fn test_to_csv_quotes_free_text() {
        let mut store = store();
        let key = AttendanceKey::parse("2024-01-01", "CS101").unwrap();
        store.set_status(&key, "A", Status::Present).unwrap();

        let csv = to_csv(&store, &key).unwrap();
        assert_eq!(
            csv,
            "Name,Roll,Dept,Status\n\
             Amit Patil,A,Computer,Present\n\
             \"Riya \"\"Ri\"\" Sharma\",B,\"Computer, IT\",Absent\n"
        );
    }

    #[test]
    fn test_to_csv_quotes_line_breaks() {
        let roster = Roster::new(vec![Student {
            id: 1,
            name: "Amit\nPatil".to_string(),
            roll: "A".to_string(),
            dept: "Computer \"Lab\", Block\nB".to_string(),
            percent: 80,
        }])
        .unwrap();
        let store = AttendanceStore::new(roster);
        let key = AttendanceKey::parse("2024-01-01", "CS101").unwrap();

        let csv = to_csv(&store, &key).unwrap();
        assert_eq!(
            csv,
            "Name,Roll,Dept,Status\n\
             \"Amit\nPatil\",A,\"Computer \"\"Lab\"\", Block\nB\",Absent\n"
        );

        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr
            .records()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "Amit\nPatil");
        assert_eq!(&rows[0][2], "Computer \"Lab\", Block\nB");
    }

    #[test]
    fn test_export_filename() {
        let key = AttendanceKey::parse("2024-01-01", "CS101").unwrap();
        assert_eq!(export_filename(&key).unwrap(), "attendance_2024-01-01_CS101.csv");
    }

    #[test]
    fn test_export_filename_rejects_path_like_subjects() {
        for subject in ["../x", "a/b", "a\\b", "..", ""] {
            let key = AttendanceKey::parse("2024-01-01", subject).unwrap();
            assert!(matches!(
                export_filename(&key),
                Err(AttendanceError::InvalidSubject(_))
            ));
        }
    }

    #[test]
    fn test_write_csv_stays_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("exports");
        std::fs::create_dir(&inner).unwrap();
        let key = AttendanceKey::parse("2024-01-01", "../x").unwrap();

        assert!(write_csv(&inner, &store(), &key).is_err());
        assert!(!dir.path().join("x.csv").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let store = store();
        let key = AttendanceKey::parse("2024-03-05", "CS103").unwrap();

        let path = write_csv(dir.path(), &store, &key).unwrap();
        assert_eq!(path, dir.path().join("attendance_2024-03-05_CS103.csv"));

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.ends_with("Absent\n"));
    }
}
