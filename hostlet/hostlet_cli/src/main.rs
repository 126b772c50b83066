use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use hostlet_core::utils::init_logging;
use hostlet_core::{LogLevel, Orientation};
use hostlet_runtime::ShellConfig;

mod commands;
mod demo;
mod headless;

/// Hostlet command line host
///
/// Loads guest modules and runs them against a headless host window that
/// prints every window action to stdout.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overrides the configuration
    #[clap(long, global = true)]
    log_level: Option<LogLevel>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the entry points a module declares
    Entries {
        /// Module root directory
        #[clap(long)]
        module: PathBuf,

        /// Print JSON instead of a numbered list
        #[clap(long)]
        json: bool,
    },

    /// Run a module with the built-in demo guests
    Run {
        /// Module root directory
        #[clap(long)]
        module: PathBuf,

        /// Requested orientation
        #[clap(long, default_value = "host-default")]
        orientation: Orientation,

        /// Data directory, overrides the configuration
        #[clap(long)]
        data_dir: Option<PathBuf>,

        /// Entry to start when the module declares several (1-based)
        #[clap(long)]
        choose: Option<usize>,

        /// Seconds to run before exiting on the user's behalf
        #[clap(long, default_value_t = 5)]
        timeout: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match ShellConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(2);
        }
    };
    init_logging(cli.log_level.unwrap_or(config.log_level));

    let result = match cli.command {
        Commands::Entries { module, json } => commands::entries::execute(&config, &module, json),
        Commands::Run {
            module,
            orientation,
            data_dir,
            choose,
            timeout,
        } => commands::run::execute(
            config,
            commands::run::RunArgs {
                module,
                orientation,
                data_dir,
                choose,
                timeout,
            },
        ),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}
