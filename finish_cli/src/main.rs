//! # Finishwise Console
//!
//! Menu-driven calculator for wallpaper, tile and laminate. Calculations are
//! kept in a SQLite database unless `--no-db` is given.

mod app;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use finish_core::{CalcResult, CalculatorSettings, MaterialCalculator, SqliteStore};
use tracing::{info, warn};

use crate::app::App;

#[derive(Parser, Debug)]
#[command(author, version, about = "Finishing materials calculator", long_about = None)]
struct Args {
    /// SQLite database file
    #[arg(long, default_value = "data/materials_calculator.db")]
    db: PathBuf,

    /// Do not open a database; nothing is persisted
    #[arg(long)]
    no_db: bool,

    /// Calculator settings (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let calculator = match build_calculator(&args) {
        Ok(calculator) => calculator,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let store = open_store(&args);
    let calculator = match &store {
        Some(store) => calculator.with_store(Box::new(store.clone())),
        None => calculator,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut app = App::new(stdin.lock(), stdout.lock(), calculator, store);

    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_calculator(args: &Args) -> CalcResult<MaterialCalculator> {
    let settings = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading settings");
            CalculatorSettings::load(path)?
        }
        None => CalculatorSettings::default(),
    };
    MaterialCalculator::with_settings(settings)
}

/// A database that fails to open is reported and the session runs without one.
fn open_store(args: &Args) -> Option<SqliteStore> {
    if args.no_db {
        return None;
    }

    match SqliteStore::open(&args.db) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(path = %args.db.display(), error = %e, "database unavailable");
            eprintln!("Database unavailable ({}); continuing without it", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["finishwise"]);
        assert_eq!(args.db, PathBuf::from("data/materials_calculator.db"));
        assert!(!args.no_db);
        assert!(args.config.is_none());
        assert!(open_store(&Args::parse_from(["finishwise", "--no-db"])).is_none());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.toml");
        std::fs::write(&path, "reserve_percent = 15.0\ncurrency = \"€\"\n").unwrap();

        let args = Args::parse_from(["finishwise", "--config", path.to_str().unwrap()]);
        let calculator = build_calculator(&args).unwrap();
        assert_eq!(calculator.reserve_percent(), 15.0);
        assert_eq!(calculator.currency(), "€");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.toml");
        std::fs::write(&path, "reserve_percent = -5.0\n").unwrap();

        let args = Args::parse_from(["finishwise", "--config", path.to_str().unwrap()]);
        assert!(build_calculator(&args).is_err());
    }

    #[test]
    fn test_store_opened_in_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("data").join("calc.db");
        let args = Args::parse_from(["finishwise", "--db", db.to_str().unwrap()]);
        assert!(open_store(&args).is_some());
        assert!(db.exists());
    }
}
