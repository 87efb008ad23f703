use clap::{
    CommandFactory, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
    error::ErrorKind,
};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

mod color;
mod commands;
mod config;
mod counterpart;
mod error;
mod exit;
mod outcome;
mod runner;
mod signals;
mod terminate;

use error::Error;
use outcome::Outcome;
use terminate::TERMINATOR;

#[derive(Parser)]
#[command(name = "buildexit", version, styles = STYLES)]
#[command(about = "Inspect and enforce the build client's exit status contract")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable verbose output (debug-level logging)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Use a specific config file (ignores default config locations)
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every exit status with its value and meaning
    #[command(visible_alias = "ls")]
    List {
        /// Print only the fingerprint of the table
        #[arg(long)]
        fingerprint: bool,
    },
    /// Print the value bound to an exit status name
    Lookup {
        /// Symbolic name, e.g. BAD_ARGV
        name: String,
    },
    /// Show which exit status an outcome maps to
    #[command(
        after_help = "OUTCOME is one of: completed, invalid-arguments, conflicting-flags,\n\
        invalid-env:NAME, missing-env:NAME, invalid-config, command-not-found:CMD,\n\
        io[:KIND], exit:N, signal:N, panic, registry-inconsistent.\n\
        Anything else maps to INTERNAL_ERROR."
    )]
    Classify {
        /// Outcome to classify
        outcome: String,
    },
    /// Pick the final exit status among several reported ones
    Select {
        /// Reported statuses, by name or value, in the order they occurred
        #[arg(required = true)]
        candidates: Vec<String>,
    },
    /// Validate the registry and its copy in the launcher header
    Check {
        /// Counterpart header to compare against (default: counterpart_header from config)
        #[arg(long, value_name = "FILE")]
        header: Option<PathBuf>,
    },
    /// Run a command and exit with its classified status
    Run {
        /// Command and arguments to execute
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
}

/// Classify an outcome and hand it to the terminator.
fn report(outcome: &Outcome) {
    let status = outcome::classify(outcome);
    if TERMINATOR.report(status) {
        debug!(%outcome, %status, "Reported outcome");
    } else if TERMINATOR.is_sealed() {
        debug!(%outcome, %status, "Exit status already committed, report ignored");
    } else {
        debug!(%outcome, %status, kept = %TERMINATOR.current(), "Earlier report takes precedence");
    }
}

/// Print the error, report it, and exit.
fn fail(e: &Error) -> ! {
    eprintln!("Error: {}", e);
    report(&e.outcome());
    TERMINATOR.exit()
}

/// Unhandled panics exit through the terminator instead of with 101.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);
        TERMINATOR.report(outcome::classify(&Outcome::Panicked));
        TERMINATOR.exit();
    }));
}

/// Initialize tracing. RUST_LOG takes precedence, otherwise use --verbose.
/// A RUST_LOG that does not parse is still reported, after logging is up.
fn init_tracing(verbose: bool) -> Result<(), Error> {
    let default = if verbose { "debug" } else { "warn" };

    let (filter, invalid) = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) => match EnvFilter::try_new(&value) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new(default), Some(e.to_string())),
        },
        Err(std::env::VarError::NotPresent) => (EnvFilter::new(default), None),
        Err(std::env::VarError::NotUnicode(_)) => {
            (EnvFilter::new(default), Some("not valid unicode".to_string()))
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();

    match invalid {
        Some(reason) => Err(Error::InvalidEnv {
            name: EnvFilter::DEFAULT_ENV,
            reason,
        }),
        None => Ok(()),
    }
}

fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(env) = init_tracing(false) {
                report(&env.outcome());
            }
            let outcome = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Outcome::Completed,
                ErrorKind::ArgumentConflict => Outcome::ConflictingFlags(e.to_string()),
                kind => Outcome::InvalidArguments(
                    kind.as_str().unwrap_or("invalid arguments").to_string(),
                ),
            };
            report(&outcome);
            if let Err(io) = e.print() {
                warn!(error = %io, "Failed to write usage message");
                report(&Outcome::Io(io.kind()));
            }
            TERMINATOR.exit()
        }
    }
}

fn main() {
    install_panic_hook();

    let cli = parse_args();

    if let Err(e) = init_tracing(cli.verbose) {
        fail(&e);
    }

    let Some(command) = cli.command else {
        // Print help when no command is provided
        if let Err(e) = Cli::command().print_help() {
            fail(&Error::Io(e));
        }
        println!();
        report(&Outcome::Completed);
        TERMINATOR.exit()
    };

    // Only check and run read settings; the lookup commands work without any.
    let config = match (&cli.config_file, &command) {
        (Some(path), _) => config::Config::load_file(path),
        (None, Commands::Check { .. } | Commands::Run { .. }) => config::Config::load(),
        (None, _) => Ok(config::Config::default()),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => fail(&e),
    };

    if config.trap_signals() {
        if let Err(e) = signals::install() {
            warn!(error = %e, "Failed to install signal handlers");
        }
    }

    let use_color = color::should_use_color(false);
    let result = match command {
        Commands::List { fingerprint } => commands::list::run(fingerprint, use_color),
        Commands::Lookup { name } => commands::lookup::run(&name),
        Commands::Classify { outcome } => commands::classify::run(&outcome),
        Commands::Select { candidates } => commands::select::run(&candidates),
        Commands::Check { header } => commands::check::run(header, &config, cli.quiet),
        Commands::Run { command } => commands::run::run(&command, cli.quiet),
    };

    match result {
        Ok(outcome) => report(&outcome),
        Err(e) => {
            eprintln!("Error: {}", e);
            report(&e.outcome());
        }
    }

    TERMINATOR.exit()
}
