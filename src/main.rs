use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tidywatch::cli;
use tidywatch::config::ClassifierKind;

/// Watch directories and sort files into category subfolders.
#[derive(Parser)]
#[command(name = "tidywatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one organization pass over a directory.
    Organize {
        /// Directory to organize.
        path: PathBuf,

        /// Show what would be moved without touching anything.
        #[arg(long)]
        dry_run: bool,

        /// Use the screenshot/screen-recording classifier instead of the
        /// extension table.
        #[arg(long)]
        screengrabs: bool,

        /// JSON extension table; the built-in table is used when absent.
        #[arg(long, value_name = "FILE")]
        table: Option<PathBuf>,

        /// Configuration file (filters).
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Watch every configured root and organize on changes until stopped.
    Watch {
        /// Configuration file with [[roots]] entries.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Organize {
            path,
            dry_run,
            screengrabs,
            table,
            config,
        } => {
            let kind = if screengrabs {
                ClassifierKind::Screengrabs
            } else {
                ClassifierKind::Extensions
            };
            cli::run_organize(&path, kind, table.as_deref(), dry_run, config.as_deref())
        }
        Command::Watch { config } => cli::run_watch(config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
