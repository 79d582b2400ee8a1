//! The interactive register: a line-oriented loop over one [`AttendanceStore`].
//!
//! The session tracks the current date and subject. Switching either one never discards the marks
//! recorded for earlier sessions.

use crate::config::Settings;
use crate::display;
use crate::error::Result;
use crate::export;
use crate::metrics;
use crate::mock::{MockSource, mock_record};
use crate::models::{AttendanceKey, Status, parse_date};
use crate::store::{AttendanceStore, RegisterFilter};

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(multicall = true)]
struct Line {
    #[command(subcommand)]
    command: SessionCommand,
}

/// Commands accepted at the session prompt.
#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Mark one or more students present.
    Present {
        #[arg(required = true)]
        rolls: Vec<String>,
    },

    /// Mark one or more students absent.
    Absent {
        #[arg(required = true)]
        rolls: Vec<String>,
    },

    /// Mark every student present, replacing earlier marks for this session.
    AllPresent,

    /// Clear every mark for this session.
    Reset,

    /// Switch to another date (YYYY-MM-DD).
    Date { date: String },

    /// Switch to another subject.
    Subject { code: String },

    /// Show the register: all, present, or absent.
    Show {
        #[arg(default_value = "all")]
        filter: String,
    },

    /// Show present/absent counts for this session and its date.
    Stats,

    /// List recorded sessions, optionally narrowed to one date or subject.
    Sessions {
        /// Only sessions on this date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,

        /// Only sessions for this subject code.
        #[arg(long)]
        subject: Option<String>,
    },

    /// List students below the defaulter threshold.
    Defaulters,

    /// Show the aggregate attendance chart.
    Chart,

    /// Show one student's attendance across all sessions.
    Summary { roll: String },

    /// Export this session as CSV into a directory.
    Export { dir: Option<PathBuf> },

    /// Leave the session.
    #[command(alias = "exit")]
    Quit,
}

enum Reply {
    Output(String),
    Quit,
}

/// An interactive attendance session.
pub struct Session {
    store: AttendanceStore,
    settings: Settings,
    key: AttendanceKey,
    mock_fill: Option<Box<dyn MockSource>>,
}

impl Session {
    pub fn new(store: AttendanceStore, settings: Settings, key: AttendanceKey) -> Self {
        Self {
            store,
            settings,
            key,
            mock_fill: None,
        }
    }

    /// Seeds every session from `source` the first time it is switched to.
    pub fn with_mock_fill(mut self, source: Box<dyn MockSource>) -> Self {
        self.mock_fill = Some(source);
        self
    }

    pub fn key(&self) -> &AttendanceKey {
        &self.key
    }

    pub fn store(&self) -> &AttendanceStore {
        &self.store
    }

    /// Reads commands from `input` until `quit` or end of input.
    ///
    /// Rejected commands are reported on `output` and the loop carries on.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        self.prompt(&mut output)?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                self.prompt(&mut output)?;
                continue;
            }

            match self.execute_line(&line) {
                Ok(Reply::Output(text)) => writeln!(output, "{text}")?,
                Ok(Reply::Quit) => return Ok(()),
                Err(message) => writeln!(output, "{message}")?,
            }

            self.prompt(&mut output)?;
        }

        Ok(())
    }

    fn prompt<W: Write>(&self, output: &mut W) -> io::Result<()> {
        write!(output, "[{}]> ", self.key)?;
        output.flush()
    }

    fn execute_line(&mut self, line: &str) -> std::result::Result<Reply, String> {
        let parsed = Line::try_parse_from(line.split_whitespace()).map_err(|err| {
            err.render().to_string().trim_end().to_string()
        })?;

        debug!(command = ?parsed.command, "session command");
        self.execute(parsed.command)
            .map_err(|err| format!("error: {err}"))
    }

    fn execute(&mut self, command: SessionCommand) -> Result<Reply> {
        let text = match command {
            SessionCommand::Present { rolls } => self.mark(&rolls, Status::Present)?,
            SessionCommand::Absent { rolls } => self.mark(&rolls, Status::Absent)?,
            SessionCommand::AllPresent => {
                self.store.mark_all_present(&self.key);
                format!("Marked all {} students present.", self.store.roster().len())
            }
            SessionCommand::Reset => {
                self.store.reset_session(&self.key);
                format!("Cleared all marks for {}.", self.key)
            }
            SessionCommand::Date { date } => {
                let date = parse_date(&date)?;
                self.switch_to(AttendanceKey::new(date, self.key.subject.clone()))?
            }
            SessionCommand::Subject { code } => {
                let subject = self.settings.require_subject(&code)?;
                let key = AttendanceKey::new(self.key.date, subject.code.clone());
                self.switch_to(key)?
            }
            SessionCommand::Show { filter } => {
                let filter: RegisterFilter = filter.parse()?;
                let rows = self.store.register(&self.key, filter);
                display::register_table(&self.key, &rows)
            }
            SessionCommand::Stats => {
                let split = metrics::present_absent_split(&self.store, &self.key);
                let stats = self.store.session_stats(self.key.date, None);
                format!(
                    "{}\n{}",
                    display::split_table(split),
                    display::stats_table(&stats)
                )
            }
            SessionCommand::Sessions { date, subject } => {
                let date = date.as_deref().map(parse_date).transpose()?;
                let sessions: Vec<_> = self
                    .store
                    .sessions_matching(date, subject.as_deref())
                    .into_iter()
                    .map(|key| (key, metrics::present_absent_split(&self.store, key)))
                    .collect();
                display::sessions_table(&sessions)
            }
            SessionCommand::Defaulters => {
                let threshold = self.settings.defaulter_threshold;
                let defaulters = metrics::defaulters_with_threshold(self.store.roster(), threshold);
                display::defaulters_table(&defaulters, threshold)
            }
            SessionCommand::Chart => {
                let series =
                    metrics::aggregate_bar_series(self.store.roster(), self.settings.chart_limit);
                display::chart_table(&series)
            }
            SessionCommand::Summary { roll } => {
                display::summary_table(&self.store.student_summary(&roll)?)
            }
            SessionCommand::Export { dir } => {
                let dir = dir.unwrap_or_else(|| self.settings.export_dir.clone());
                let path = export::write_csv(dir, &self.store, &self.key)?;
                format!("Exported {}.", path.display())
            }
            SessionCommand::Quit => return Ok(Reply::Quit),
        };

        Ok(Reply::Output(text))
    }

    fn mark(&mut self, rolls: &[String], status: Status) -> Result<String> {
        let rolls: Vec<&str> = rolls.iter().map(String::as_str).collect();
        let count = self.store.mark(&self.key, &rolls, status)?;
        Ok(format!("Marked {count} student(s) {}.", status.as_str()))
    }

    fn switch_to(&mut self, key: AttendanceKey) -> Result<String> {
        if let Some(source) = self.mock_fill.as_mut() {
            if !self.store.has_session(&key) {
                let record = mock_record(source.as_mut(), self.store.roster());
                self.store.seed_session(&key, record)?;
            }
        }

        info!(from = %self.key, to = %key, "switched session");
        self.key = key;

        let split = metrics::present_absent_split(&self.store, &self.key);
        Ok(format!(
            "Now recording {} ({} present, {} absent).",
            self.key, split.present, split.absent
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::SeededMock;
    use crate::roster::{Roster, student};

    fn session() -> Session {
        let roster = Roster::new(vec![
            student(1, "Amit Patil", "A", 80),
            student(2, "Riya Sharma", "B", 70),
            student(3, "Suresh More", "C", 90),
        ])
        .unwrap();
        let key = AttendanceKey::parse("2024-01-01", "CS101").unwrap();
        Session::new(AttendanceStore::new(roster), Settings::default(), key)
    }

    fn run(session: &mut Session, script: &str) -> String {
        let mut output = Vec::new();
        session.run(script.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_marks_and_switches_sessions() {
        let mut session = session();
        let output = run(
            &mut session,
            "present A B\nsubject CS102\nabsent A\ndate 2024-01-01\nsubject CS101\n",
        );
        assert!(output.contains("Marked 2 student(s) present."));
        assert!(output.contains("Now recording 2024-01-01 CS102"));

        let store = session.store();
        let k1 = AttendanceKey::parse("2024-01-01", "CS101").unwrap();
        let k2 = AttendanceKey::parse("2024-01-01", "CS102").unwrap();
        assert_eq!(store.status_of(&k1, "A"), Status::Present);
        assert_eq!(store.status_of(&k2, "A"), Status::Absent);
        assert_eq!(session.key(), &k1);
    }

    #[test]
    fn test_errors_do_not_end_session() {
        let mut session = session();
        let output = run(
            &mut session,
            "present Z\nshow late\nsubject XX999\ndate tomorrow\nall-present\n",
        );
        assert!(output.contains("error: student with roll 'Z' is not on the roster"));
        assert!(output.contains("error: invalid attendance status 'late'"));
        assert!(output.contains("error: unknown subject 'XX999'"));
        assert!(output.contains("error: invalid session date 'tomorrow'"));
        assert!(output.contains("Marked all 3 students present."));
    }

    #[test]
    fn test_unknown_command_reports_usage() {
        let mut session = session();
        let output = run(&mut session, "teleport\nquit\npresent A\n");
        assert!(output.contains("teleport"));
        let key = session.key().clone();
        assert_eq!(session.store().status_of(&key, "A"), Status::Absent);
    }

    #[test]
    fn test_repeated_rolls_are_counted_once() {
        let mut session = session();
        let output = run(&mut session, "present A A A\n");
        assert!(output.contains("Marked 1 student(s) present."));
    }

    #[test]
    fn test_sessions_lists_matching_keys() {
        let mut session = session();
        run(
            &mut session,
            "present A B\nsubject CS102\nabsent C\ndate 2024-01-02\nall-present\n",
        );

        let by_subject = run(&mut session, "sessions --subject CS102\n");
        assert!(by_subject.contains("│ 2024-01-01"));
        assert!(by_subject.contains("│ 2024-01-02"));
        assert!(!by_subject.contains("│ CS101"));

        let by_date = run(&mut session, "sessions --date 2024-01-01\n");
        assert!(by_date.contains("│ CS101"));
        assert!(by_date.contains("│ CS102"));
        assert!(!by_date.contains("│ 2024-01-02"));

        let none = run(&mut session, "sessions --date 2030-01-01\n");
        assert!(none.contains("No sessions recorded."));

        let bad = run(&mut session, "sessions --date soon\n");
        assert!(bad.contains("error: invalid session date 'soon'"));
    }

    #[test]
    fn test_sessions_table_counts() {
        let mut session = session();
        let output = run(&mut session, "present A B\nsessions\n");
        assert!(output.contains("CS101"));
        assert!(output.contains("│ 2 "));
        assert!(output.contains("│ 1 "));
    }

    #[test]
    fn test_show_filters_register() {
        let mut session = session();
        let output = run(&mut session, "present B\nshow present\n");
        assert!(output.contains("Riya Sharma"));
        assert!(!output.contains("Amit Patil"));
    }

    #[test]
    fn test_summary_and_stats() {
        let mut session = session();
        let output = run(&mut session, "present A\nsummary A\nstats\n");
        assert!(output.contains("100.00"));
        assert!(output.contains("Records"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        let script = format!("present C\nexport {}\n", dir.path().display());
        let output = run(&mut session, &script);
        assert!(output.contains("Exported"));

        let contents =
            std::fs::read_to_string(dir.path().join("attendance_2024-01-01_CS101.csv")).unwrap();
        assert!(contents.contains("Suresh More,C,Computer,Present"));
    }

    #[test]
    fn test_mock_fill_seeds_new_sessions_once() {
        let mut session = session().with_mock_fill(Box::new(SeededMock::new(1)));
        run(&mut session, "subject CS102\nreset\nsubject CS101\nsubject CS102\n");

        let k2 = AttendanceKey::parse("2024-01-01", "CS102").unwrap();
        let store = session.store();
        assert!(store.has_session(&k2));
        assert_eq!(store.present_count(&k2), 0);
    }
}
