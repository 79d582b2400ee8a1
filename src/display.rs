//! Table rendering for the command line, built on [`tabled`].

use crate::metrics::{BarPoint, PresentAbsentSplit, pie_series};
use crate::models::{AttendanceKey, Student, Subject};
use crate::roster::Roster;
use crate::store::{RegisterRow, SessionStats, StudentSummary};

use tabled::{Table, Tabled, settings::Style};

fn render(mut table: Table) -> String {
    table.with(Style::modern());
    table.to_string()
}

/// The roster, with every column when `verbose` and just roll and name otherwise.
pub fn roster_table(roster: &Roster, verbose: bool) -> String {
    if verbose {
        return render(Table::new(roster.students()));
    }

    #[derive(Tabled)]
    struct SimpleStudent<'a> {
        #[tabled(rename = "Roll")]
        roll: &'a str,
        #[tabled(rename = "Name")]
        name: &'a str,
    }

    let simplified_roster = roster.iter().map(|student| SimpleStudent {
        roll: &student.roll,
        name: &student.name,
    });

    render(Table::new(simplified_roster))
}

/// The register for one session.
pub fn register_table(key: &AttendanceKey, rows: &[RegisterRow<'_>]) -> String {
    #[derive(Tabled)]
    struct Line<'a> {
        #[tabled(rename = "#")]
        position: usize,
        #[tabled(rename = "Student")]
        name: &'a str,
        #[tabled(rename = "Roll")]
        roll: &'a str,
        #[tabled(rename = "Dept")]
        dept: &'a str,
        #[tabled(rename = "Status")]
        status: String,
    }

    let lines = rows.iter().map(|row| Line {
        position: row.position,
        name: &row.student.name,
        roll: &row.student.roll,
        dept: &row.student.dept,
        status: row.status.to_string(),
    });

    format!("Attendance register for {key}:\n{}", render(Table::new(lines)))
}

pub fn defaulters_table(defaulters: &[&Student], threshold: u8) -> String {
    if defaulters.is_empty() {
        return format!("No students below {threshold}%.");
    }

    format!(
        "Students below {threshold}%:\n{}",
        render(Table::new(defaulters.iter().copied()))
    )
}

/// The aggregate chart as a table with a text bar per student.
pub fn chart_table(series: &[BarPoint]) -> String {
    #[derive(Tabled)]
    struct Bar<'a> {
        #[tabled(rename = "Student")]
        label: &'a str,
        #[tabled(rename = "%")]
        percent: u8,
        #[tabled(rename = "")]
        bar: String,
    }

    let bars = series.iter().map(|point| Bar {
        label: &point.label,
        percent: point.percent,
        bar: "#".repeat(usize::from(point.percent / 5)),
    });

    render(Table::new(bars))
}

pub fn split_table(split: PresentAbsentSplit) -> String {
    #[derive(Tabled)]
    struct Slice {
        #[tabled(rename = "Status")]
        label: &'static str,
        #[tabled(rename = "Students")]
        count: usize,
    }

    let slices = pie_series(split)
        .into_iter()
        .map(|(label, count)| Slice { label, count });

    render(Table::new(slices))
}

/// Recorded sessions with their present/absent counts.
pub fn sessions_table(sessions: &[(&AttendanceKey, PresentAbsentSplit)]) -> String {
    if sessions.is_empty() {
        return "No sessions recorded.".to_string();
    }

    #[derive(Tabled)]
    struct Line<'a> {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Subject")]
        subject: &'a str,
        #[tabled(rename = "Present")]
        present: usize,
        #[tabled(rename = "Absent")]
        absent: usize,
    }

    let lines = sessions.iter().map(|(key, split)| Line {
        date: key.date.to_string(),
        subject: &key.subject,
        present: split.present,
        absent: split.absent,
    });

    render(Table::new(lines))
}

pub fn summary_table(summary: &StudentSummary) -> String {
    #[derive(Tabled)]
    struct Line<'a> {
        #[tabled(rename = "Roll")]
        roll: &'a str,
        #[tabled(rename = "Name")]
        name: &'a str,
        #[tabled(rename = "Present")]
        present: usize,
        #[tabled(rename = "Sessions")]
        total: usize,
        #[tabled(rename = "%")]
        percent: String,
    }

    render(Table::new([Line {
        roll: &summary.roll,
        name: &summary.name,
        present: summary.present,
        total: summary.total,
        percent: format!("{:.2}", summary.percent),
    }]))
}

pub fn stats_table(stats: &SessionStats) -> String {
    #[derive(Tabled)]
    struct Line {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Subject")]
        subject: String,
        #[tabled(rename = "Records")]
        total_records: usize,
        #[tabled(rename = "Present")]
        present: usize,
        #[tabled(rename = "Absent")]
        absent: usize,
    }

    render(Table::new([Line {
        date: stats.date.to_string(),
        subject: stats.subject.clone().unwrap_or_else(|| "all".to_string()),
        total_records: stats.total_records,
        present: stats.present,
        absent: stats.absent,
    }]))
}

pub fn subjects_table(subjects: &[Subject]) -> String {
    render(Table::new(subjects))
}
