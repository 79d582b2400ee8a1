//! Property tests for the store invariants.

use attendance_register::export::to_csv;
use attendance_register::metrics::{defaulters, present_absent_split};
use attendance_register::mock::{SeededMock, mock_roster};
use attendance_register::{AttendanceKey, AttendanceStore, Roster, Status, Student};
use proptest::prelude::*;

fn key(day: u32, subject: &str) -> AttendanceKey {
    AttendanceKey::parse(&format!("2024-01-{day:02}"), subject).unwrap()
}

/// A mark to apply: roster index, day of month, subject index, present or not.
fn mark_strategy() -> impl Strategy<Value = Vec<(usize, u32, usize, bool)>> {
    prop::collection::vec((0usize..12, 1u32..5, 0usize..3, any::<bool>()), 0..60)
}

const SUBJECTS: [&str; 3] = ["CS101", "CS102", "CS103"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_split_sums_to_roster(seed in any::<u64>(), marks in mark_strategy()) {
        let roster = mock_roster(&mut SeededMock::new(seed), 12).unwrap();
        let rolls: Vec<String> = roster.rolls().map(str::to_string).collect();
        let mut store = AttendanceStore::new(roster);

        for (idx, day, subject, present) in &marks {
            let status = if *present { Status::Present } else { Status::Absent };
            store.set_status(&key(*day, SUBJECTS[*subject]), &rolls[*idx], status).unwrap();
        }

        for day in 1..5 {
            for subject in SUBJECTS {
                let k = key(day, subject);
                let split = present_absent_split(&store, &k);
                prop_assert_eq!(split.present + split.absent, 12);
                prop_assert_eq!(split.present, store.present_count(&k));
            }
        }
    }

    #[test]
    fn prop_last_write_wins(marks in mark_strategy()) {
        let roster = mock_roster(&mut SeededMock::new(5), 12).unwrap();
        let rolls: Vec<String> = roster.rolls().map(str::to_string).collect();
        let mut store = AttendanceStore::new(roster);

        let mut expected = std::collections::HashMap::new();
        for (idx, day, subject, present) in &marks {
            let k = key(*day, SUBJECTS[*subject]);
            let status = if *present { Status::Present } else { Status::Absent };
            store.set_status(&k, &rolls[*idx], status).unwrap();
            expected.insert((k, *idx), status);
        }

        for day in 1..5 {
            for subject in SUBJECTS {
                let k = key(day, subject);
                for (idx, roll) in rolls.iter().enumerate() {
                    let want = expected
                        .get(&(k.clone(), idx))
                        .copied()
                        .unwrap_or(Status::Absent);
                    prop_assert_eq!(store.status_of(&k, roll), want);
                }
            }
        }
    }

    #[test]
    fn prop_mark_all_present_is_idempotent(seed in any::<u64>(), marks in mark_strategy()) {
        let roster = mock_roster(&mut SeededMock::new(seed), 12).unwrap();
        let rolls: Vec<String> = roster.rolls().map(str::to_string).collect();
        let mut store = AttendanceStore::new(roster);
        let k = key(1, "CS101");

        for (idx, _, _, present) in &marks {
            let status = if *present { Status::Present } else { Status::Absent };
            store.set_status(&k, &rolls[*idx], status).unwrap();
        }

        store.mark_all_present(&k);
        let once = store.get_record(&k).clone();
        store.mark_all_present(&k);

        prop_assert_eq!(store.get_record(&k), &once);
        prop_assert_eq!(store.present_count(&k), 12);
    }

    #[test]
    fn prop_defaulters_are_exactly_below_75(seed in any::<u64>()) {
        let roster = mock_roster(&mut SeededMock::new(seed), 18).unwrap();
        let found = defaulters(&roster);

        for student in &roster {
            let listed = found.iter().any(|d| d.roll == student.roll);
            prop_assert_eq!(listed, student.percent < 75);
        }
    }

    #[test]
    fn prop_csv_has_one_row_per_student(seed in any::<u64>(), marks in mark_strategy()) {
        let roster = mock_roster(&mut SeededMock::new(seed), 12).unwrap();
        let rolls: Vec<String> = roster.rolls().map(str::to_string).collect();
        let mut store = AttendanceStore::new(roster);
        let k = key(2, "CS102");

        for (idx, _, _, present) in &marks {
            let status = if *present { Status::Present } else { Status::Absent };
            store.set_status(&k, &rolls[*idx], status).unwrap();
        }

        let csv = to_csv(&store, &k).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();

        prop_assert_eq!(rows.len(), 12);
        for (row, roll) in rows.iter().zip(&rolls) {
            prop_assert_eq!(&row[1], roll.as_str());
            prop_assert_eq!(&row[3], store.status_of(&k, roll).to_string());
        }
    }
}

/// Free-text fields that need quoting: quotes, commas, and line breaks.
fn free_text() -> impl Strategy<Value = String> {
    "[a-zA-Z ,\"\n]{1,12}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_csv_round_trips_free_text(
        people in prop::collection::vec((free_text(), free_text(), any::<bool>()), 1..10),
    ) {
        let students = people
            .iter()
            .enumerate()
            .map(|(idx, (name, dept, _))| Student {
                id: idx as u32 + 1,
                name: name.clone(),
                roll: format!("R{idx}"),
                dept: dept.clone(),
                percent: 80,
            })
            .collect();
        let mut store = AttendanceStore::new(Roster::new(students).unwrap());
        let k = key(3, "CS103");

        for (idx, (_, _, present)) in people.iter().enumerate() {
            let status = if *present { Status::Present } else { Status::Absent };
            store.set_status(&k, &format!("R{idx}"), status).unwrap();
        }

        let csv = to_csv(&store, &k).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();

        prop_assert_eq!(rows.len(), people.len());
        for (row, student) in rows.iter().zip(store.roster()) {
            prop_assert_eq!(&row[0], student.name.as_str());
            prop_assert_eq!(&row[1], student.roll.as_str());
            prop_assert_eq!(&row[2], student.dept.as_str());
            prop_assert_eq!(&row[3], store.status_of(&k, &student.roll).to_string());
        }
    }
}
