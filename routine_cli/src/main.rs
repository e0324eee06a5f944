use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use routine_core::store::list_documents;
use routine_core::*;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "routine")]
#[command(about = "Recurring routine tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override routines directory
    #[arg(long, global = true)]
    routines_dir: Option<PathBuf>,

    /// Override the number of history entries kept per routine
    #[arg(long, global = true)]
    history_limit: Option<usize>,

    /// Reset policy (period_aware, scheduled_date)
    #[arg(long, global = true)]
    policy: Option<ResetPolicy>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a recurrence phrase is understood
    Parse {
        /// Recurrence phrase, e.g. "monthly on the third thursday"
        text: String,
    },

    /// Show the current and next period starts for a recurrence phrase
    Period {
        text: String,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Check one routine document and reset it if its period has elapsed
    Check {
        file: PathBuf,

        /// Evaluate as of this date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Show the outcome without saving the document
        #[arg(long)]
        dry_run: bool,
    },

    /// Check every routine document in the routines directory
    Sync {
        #[arg(long)]
        today: Option<NaiveDate>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Show the current streak of a routine document
    Streak {
        file: PathBuf,

        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Evaluate a routine given as JSON on stdin and print the result as JSON
    Evaluate,
}

/// Effective settings after applying CLI overrides to the config file
struct Settings {
    routines_dir: PathBuf,
    history_limit: usize,
    policy: ResetPolicy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    routine_core::logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if cli.history_limit == Some(0) {
        return Err(Error::Config("--history-limit must be at least 1".into()));
    }

    let settings = Settings {
        routines_dir: cli
            .routines_dir
            .unwrap_or_else(|| config.data.routines_dir.clone()),
        history_limit: cli.history_limit.unwrap_or(config.tracker.history_limit),
        policy: cli.policy.unwrap_or(config.tracker.reset_policy),
    };

    match cli.command {
        Commands::Parse { text } => cmd_parse(&text),
        Commands::Period { text, date } => cmd_period(&text, date.unwrap_or_else(today)),
        Commands::Check {
            file,
            today: date,
            dry_run,
        } => cmd_check(&file, date.unwrap_or_else(today), dry_run, &settings),
        Commands::Sync { today: date, dry_run } => {
            cmd_sync(date.unwrap_or_else(today), dry_run, &settings)
        }
        Commands::Streak { file, today: date } => cmd_streak(&file, date.unwrap_or_else(today)),
        Commands::Evaluate => cmd_evaluate(&settings),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn cmd_parse(text: &str) -> Result<()> {
    let (pattern, diagnostic) = parse(text);
    println!("{}", pattern);
    if let Some(diagnostic) = diagnostic {
        eprintln!("warning: {}", diagnostic);
    }
    Ok(())
}

fn cmd_period(text: &str, date: NaiveDate) -> Result<()> {
    let (pattern, diagnostic) = parse(text);
    if let Some(diagnostic) = diagnostic {
        eprintln!("warning: {}", diagnostic);
    }

    println!("Pattern:  {}", pattern);
    println!("Date:     {}", date);
    println!("Current:  {}", current_period_start(&pattern, date));
    println!("Next:     {}", next_period_start(&pattern, date));
    Ok(())
}

fn cmd_check(file: &Path, today: NaiveDate, dry_run: bool, settings: &Settings) -> Result<()> {
    let mut document = RoutineDocument::load(file)?;
    let outcome = document.check(today, settings.history_limit, settings.policy);

    display_outcome(&document, &outcome);

    if dry_run {
        println!("\n[Dry run - not saving]");
        return Ok(());
    }

    if !matches!(outcome.result.state, TrackerState::WithinPeriod) {
        document.save(file)?;
    }
    Ok(())
}

fn cmd_sync(today: NaiveDate, dry_run: bool, settings: &Settings) -> Result<()> {
    let paths = list_documents(&settings.routines_dir)?;
    if paths.is_empty() {
        println!(
            "No routines found in {} - nothing to sync.",
            settings.routines_dir.display()
        );
        return Ok(());
    }

    let mut checked = 0;
    let mut resets = 0;
    let mut failed = 0;

    for path in &paths {
        let mut document = match RoutineDocument::load(path) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                failed += 1;
                continue;
            }
        };

        let outcome = document.check(today, settings.history_limit, settings.policy);
        display_outcome(&document, &outcome);
        checked += 1;
        if outcome.result.reset_occurred {
            resets += 1;
        }

        if !dry_run && !matches!(outcome.result.state, TrackerState::WithinPeriod) {
            if let Err(e) = document.save(path) {
                tracing::warn!("Failed to save {:?}: {}", path, e);
                failed += 1;
            }
        }
    }

    println!();
    println!("✓ Checked {} routines ({} reset)", checked, resets);
    if failed > 0 {
        println!("  {} routines could not be processed", failed);
    }
    if dry_run {
        println!("\n[Dry run - not saving]");
    }
    Ok(())
}

fn cmd_streak(file: &Path, today: NaiveDate) -> Result<()> {
    let document = RoutineDocument::load(file)?;
    let streak = current_streak(&document.history, today);
    println!("{}: streak {}", document.name, streak);
    Ok(())
}

fn cmd_evaluate(settings: &Settings) -> Result<()> {
    let mut contents = String::new();
    std::io::stdin().read_to_string(&mut contents)?;

    let mut input: RoutineInput = serde_json::from_str(&contents)?;
    input.history_limit = input.history_limit.or(Some(settings.history_limit));
    let output = evaluate_input(&input, settings.policy)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn display_outcome(document: &RoutineDocument, outcome: &CheckOutcome) {
    if let Some(ref diagnostic) = outcome.diagnostic {
        eprintln!("warning: {}: {}", document.name, diagnostic);
    }

    let result = &outcome.result;
    match result.state {
        TrackerState::NoPriorSchedule => {
            println!("{}: not yet scheduled", document.name);
            if let Some(first) = document.scheduled {
                println!("  First reset: {}", first);
            }
        }
        TrackerState::WithinPeriod => {
            println!("{}: within period", document.name);
            if let Some(next) = result.new_scheduled_date {
                println!("  Next reset: {}", next);
            }
        }
        TrackerState::ResetDue { history_date } => {
            let archived = result.updated_history.latest();
            println!(
                "{}: reset, archived {} ({}/{})",
                document.name,
                history_date,
                archived.map(|e| e.completed).unwrap_or_default(),
                archived.map(|e| e.total).unwrap_or_default()
            );
            if let Some(next) = result.new_scheduled_date {
                println!("  Next reset: {}", next);
            }
        }
    }
    println!("  Streak: {}", result.streak);
}
