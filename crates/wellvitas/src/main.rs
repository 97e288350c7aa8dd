//! wellvitas CLI - book a free taster session at the Wellvitas clinic

mod cli;
mod colors;
mod commands;
mod interaction;
mod output;
mod splash;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::Commands;
use commands::OutputMode;

const DEFAULT_FILTER: &str = "wellvitas=warn,wellvitas_core=warn";
const VERBOSE_FILTER: &str = "wellvitas=debug,wellvitas_core=debug";

/// Log to stderr so prompts and JSON on stdout stay clean. `RUST_LOG` wins
/// over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = cli::parse();
    init_tracing(cli.verbose);

    let mode = OutputMode {
        json: cli.json,
        quiet: cli.quiet,
    };
    let config = cli.config.as_deref();

    let result = match cli.command {
        Some(Commands::Book(args)) => commands::run_book(args, config, mode),
        Some(Commands::Slots { date }) => commands::run_slots(date, config, mode),
        Some(Commands::Hours { watch }) => commands::run_hours(watch, config, mode),
        Some(Commands::Show) => commands::run_show(config, mode),
        Some(Commands::Calendar { out }) => commands::run_calendar(out, config, mode),
        Some(Commands::Reset) => commands::run_reset(config, mode),
        None => {
            // No subcommand - print version info
            if !cli.quiet {
                println!("wellvitas v{}", env!("CARGO_PKG_VERSION"));
                println!("Use --help for usage information");
            }
            Ok(0)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}
