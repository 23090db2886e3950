mod commands;
mod config;
mod context;
mod diagnostics;
mod error;
mod git;
mod host;
mod info;
mod patterns;
mod resolver;
mod scanner;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::{Format, ScanOptions};

/// Environment variable holding the log filter, e.g. `TERMREF_LOG=debug`.
const LOG_ENV: &str = "TERMREF_LOG";

#[derive(Parser)]
#[command(name = "termref", version, about = "Clickable references for terminal output")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reference syntax, rules, and current resolution state
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve and open one link found in TEXT
    Open {
        /// Text containing the link, e.g. a copied terminal line
        text: String,
        /// Zero-based index of the link among those found, in scan order
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Print the resolved action as JSON instead of performing it
        #[arg(long)]
        dry_run: bool,
    },
    /// List links found in each line of FILE, or stdin
    Scan {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Follow a log file and list links in each new line
    Watch {
        /// File to follow
        file: PathBuf,
        /// Scan the existing content before following
        #[arg(long)]
        from_start: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Output flags shared by `scan` and `watch`.
#[derive(clap::Args)]
struct OutputArgs {
    /// Report each reference once, e.g. `PR #9` without its inner `#9`
    #[arg(long)]
    dedupe: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Scan raw text without stripping ANSI escape sequences
    #[arg(long)]
    keep_ansi: bool,
}

impl From<OutputArgs> for ScanOptions {
    fn from(args: OutputArgs) -> Self {
        return Self {
            dedupe: args.dedupe,
            format: args.format,
            keep_ansi: args.keep_ansi,
        };
    }
}

/// Send logs to stderr so stdout stays machine-readable.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| return tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Info { json } => info::run(json),
        Commands::Open { text, index, dry_run } => commands::open(&text, index, dry_run),
        Commands::Scan { file, output } => commands::scan(file.as_deref(), output.into()),
        Commands::Watch { file, from_start, output } => watch::run(&file, output.into(), from_start),
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
