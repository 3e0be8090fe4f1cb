//! CLI entry point for the allocbook rebalancer.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use allocbook_rebalancer::config::{Config, OutputFormat};
use allocbook_rebalancer::execution::{self, RunOptions};
use allocbook_rebalancer::request;

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Proportional portfolio rebalancer")]
#[command(version)]
struct Cli {
    /// Path to config.toml (optional; defaults apply when absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging and the full record table
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
    Envelope,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Table => OutputFormat::Table,
            Format::Json => OutputFormat::Json,
            Format::Envelope => OutputFormat::Envelope,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Compute and print the rebalancing actions
    Run {
        /// Path to request.json
        request: PathBuf,

        /// Output format (overrides config)
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Prompt for current values even if the request has them
        #[arg(long)]
        prompt: bool,
    },

    /// Validate the model and current values without computing actions
    Check {
        /// Path to request.json
        request: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let explicit = cli.config.is_some();
    let config_path = cli.config.unwrap_or_else(|| PathBuf::from("config.toml"));
    let mut config = match Config::load_or_default(&config_path, explicit) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };
    if cli.debug {
        config.engine.debug = true;
    }

    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        config.level_filter().unwrap_or(log::LevelFilter::Info)
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    let result = match cli.command {
        Command::Run {
            request: path,
            format,
            prompt,
        } => {
            let req = match request::load(&path) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error loading request: {e}");
                    process::exit(execution::exit_code(&e));
                }
            };
            let opts = RunOptions {
                format: format.map(OutputFormat::from),
                prompt,
                request_file: path.display().to_string(),
            };
            execution::run(&config, &req, &opts)
        }
        Command::Check { request: path } => request::load(&path)
            .and_then(|req| execution::check(&config, &req))
            .map(|report| print!("{report}")),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(execution::exit_code(&e));
    }
}
