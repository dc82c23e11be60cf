//! Diagnostic CLI for the local store.
//!
//! # Responsibility
//! - Verify `pfa_core` linkage (`ping`, `version`).
//! - Export, import, seed and inspect a database file without the app.

use clap::{Parser, Subcommand};
use log::warn;
use pfa_core::config::{CoreConfig, LOG_DIR_ENV};
use pfa_core::{
    init_logging_from, open_db, AuthSession, LocalStore, TransferService, WorkoutLibrary,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pfa")]
#[command(about = "Inspect and maintain a coaching app database", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the core library is linked
    Ping,

    /// Print the core library version
    Version,

    /// Print every collection as JSON
    Export {
        #[arg(long, env = "PFA_DB_PATH")]
        db: Option<PathBuf>,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace collections from an export file
    Import {
        #[arg(long, env = "PFA_DB_PATH")]
        db: Option<PathBuf>,

        /// Export document to read
        file: PathBuf,
    },

    /// Insert the built-in exercise catalogue into an empty library
    Seed {
        #[arg(long, env = "PFA_DB_PATH")]
        db: Option<PathBuf>,
    },

    /// Print record counts per collection
    Stats {
        #[arg(long, env = "PFA_DB_PATH")]
        db: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CoreConfig::from_env();
    if std::env::var_os(LOG_DIR_ENV).is_some() {
        if let Err(err) = init_logging_from(&config) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            warn!("event=cli_command module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &CoreConfig) -> Result<(), Box<dyn Error>> {
    let db_path = |db: Option<PathBuf>| db.unwrap_or_else(|| config.db_path.clone());

    match command {
        Commands::Ping => println!("pfa_core ping={}", pfa_core::ping()),
        Commands::Version => println!("pfa_core version={}", pfa_core::core_version()),
        Commands::Export { db, out } => {
            let conn = open_db(db_path(db))?;
            let store = LocalStore::sqlite(&conn);
            let json = TransferService::new(&store).export_all()?;
            match out {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
        Commands::Import { db, file } => {
            let payload = std::fs::read_to_string(&file)?;
            let conn = open_db(db_path(db))?;
            let store = LocalStore::sqlite(&conn);
            let summary = TransferService::new(&store).import_all(&payload)?;
            for (collection, count) in &summary.collections {
                println!("{}={}", collection.export_field(), count);
            }
            println!("user_restored={}", summary.user_restored);
        }
        Commands::Seed { db } => {
            let conn = open_db(db_path(db))?;
            let store = LocalStore::sqlite(&conn);
            let session = AuthSession::signed_out();
            let inserted = WorkoutLibrary::new(&store, &session).seed_exercises()?;
            println!("exercises_inserted={inserted}");
        }
        Commands::Stats { db } => {
            let conn = open_db(db_path(db))?;
            let store = LocalStore::sqlite(&conn);
            store.log_inventory();
            println!("clients={}", store.clients().get_all().len());
            println!("exercises={}", store.exercises().get_all().len());
            println!("workouts={}", store.workouts().get_all().len());
            println!("assignments={}", store.assignments().get_all().len());
            println!("sessions={}", store.sessions().get_all().len());
            println!("exercise_logs={}", store.exercise_logs().get_all().len());
            println!(
                "signed_in={}",
                AuthSession::restore(&store.account()).is_signed_in()
            );
        }
    }
    Ok(())
}
