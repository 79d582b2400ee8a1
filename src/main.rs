use anyhow::{Context, Result};
use attendance_register::cli::{Cli, Command, SessionArgs};
use attendance_register::config::Settings;
use attendance_register::logging::{Verbosity, init_logging};
use attendance_register::mock::{SeededMock, mock_record};
use attendance_register::models::parse_date;
use attendance_register::session::Session;
use attendance_register::{
    AttendanceKey, AttendanceStore, create_default_store, display, export, metrics,
};
use chrono::Local;
use clap::Parser;
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(Verbosity::from_flags(cli.quiet, cli.verbose));

    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if let Some(roster) = cli.roster {
        settings.roster_path = Some(roster);
    }

    let mut store = create_default_store(&settings).context("failed to load roster")?;

    match cli.command {
        Command::Roster { all } => {
            println!("Roster:\n{}", display::roster_table(store.roster(), all));
        }
        Command::Defaulters { threshold } => {
            let threshold = threshold.unwrap_or(settings.defaulter_threshold);
            let defaulters = metrics::defaulters_with_threshold(store.roster(), threshold);
            println!("{}", display::defaulters_table(&defaulters, threshold));
        }
        Command::Chart { limit } => {
            let limit = limit.unwrap_or(settings.chart_limit);
            let series = metrics::aggregate_bar_series(store.roster(), limit);
            println!("{}", display::chart_table(&series));
        }
        Command::Subjects => {
            println!("{}", display::subjects_table(&settings.subjects));
        }
        Command::Export {
            session,
            output,
            stdout,
        } => {
            let key = resolve_key(&settings, &session)?;
            open_session(&mut store, &settings, &key)?;

            if stdout {
                print!("{}", export::to_csv(&store, &key)?);
            } else {
                let dir = output.unwrap_or_else(|| settings.export_dir.clone());
                let path = export::write_csv(&dir, &store, &key)
                    .with_context(|| format!("failed to export to {}", dir.display()))?;
                println!("Exported {}", path.display());
            }
        }
        Command::Session { session, mock_fill } => {
            let key = resolve_key(&settings, &session)?;
            open_session(&mut store, &settings, &key)?;

            let mut session = Session::new(store, settings.clone(), key);
            if mock_fill {
                session = session.with_mock_fill(Box::new(session_marks(&settings)));
            }

            println!("Type `help` for commands, `quit` to leave.");
            session.run(io::stdin().lock(), io::stdout())?;
        }
    }

    Ok(())
}

/// The session named on the command line, falling back to today and the default subject.
fn resolve_key(settings: &Settings, args: &SessionArgs) -> Result<AttendanceKey> {
    let date = match &args.date {
        Some(date) => parse_date(date)?,
        None => Local::now().date_naive(),
    };

    let code = args.subject.as_deref().unwrap_or(&settings.default_subject);
    let subject = settings.require_subject(code)?;

    Ok(AttendanceKey::new(date, subject.code.clone()))
}

/// Seeds the opening session with mock marks, as the dashboard does on first load.
fn open_session(
    store: &mut AttendanceStore,
    settings: &Settings,
    key: &AttendanceKey,
) -> Result<()> {
    let record = mock_record(&mut session_marks(settings), store.roster());
    store.seed_session(key, record)?;
    Ok(())
}

/// Initial marks come from their own stream so they do not repeat the roster's percentages.
fn session_marks(settings: &Settings) -> SeededMock {
    SeededMock::new(settings.seed.wrapping_add(1))
}
