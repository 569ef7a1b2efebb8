//! gblink: command-line driver for the Game Boy link-port simulation.
//!
//! Provides `gblink run` to execute the scripted stimulus schedule and write a
//! VCD waveform, and `gblink init` to write a default `gblink.toml`.

#![warn(missing_docs)]

mod init;
mod run;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// gblink: drive the link-port model and record its waveform.
#[derive(Parser, Debug)]
#[command(name = "gblink", version, about = "Game Boy link-port simulation driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `gblink.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the stimulus schedule against the link-port model.
    Run(RunArgs),
    /// Write a default `gblink.toml`.
    Init {
        /// Directory to write into (default: current directory).
        dir: Option<String>,

        /// Overwrite an existing configuration file.
        #[arg(long)]
        force: bool,
    },
}

/// Arguments for the `gblink run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Number of macro-steps (full clock periods) to run.
    #[arg(long)]
    pub steps: Option<u64>,

    /// Output path for the waveform file.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Disable waveform recording.
    #[arg(long)]
    pub no_trace: bool,

    /// Gzip-compress the waveform file.
    #[arg(long)]
    pub gzip: bool,

    /// Maximum hierarchy depth captured in the waveform.
    #[arg(long)]
    pub depth: Option<u32>,

    /// Output format for the run summary.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Runtime arguments forwarded to the model (e.g. `+finish_after_transfers=1`).
    /// Everything after the first one is forwarded too; non-plus arguments are ignored.
    #[arg(value_name = "PLUSARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub model_args: Vec<String>,
}

/// Run summary output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Init { dir, force } => init::run(dir, force, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flag-derived level.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(global)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_log_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}
