//! CLI argument parsing with clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wellvitas - book a free taster session from the terminal
#[derive(Parser)]
#[command(name = "wellvitas")]
#[command(version = VERSION)]
#[command(about = "Book a free taster session at the Wellvitas clinic")]
#[command(long_about = "Book a free taster session at the Wellvitas clinic.\n\nThe booking wizard walks through five steps (enquiry, screening, taster slot, programme, review). Progress is saved after every change, so an interrupted booking resumes where it stopped.")]
pub struct Cli {
    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to <config dir>/wellvitas/wellvitas.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start or resume the booking wizard
    #[command(long_about = "Start or resume the booking wizard.\n\nA saved booking is restored automatically. Values given on the command line override restored ones. On success the WhatsApp and email links are printed and the saved booking is removed.")]
    Book(BookArgs),

    /// List bookable taster times for a date
    #[command(long_about = "List bookable taster times for a date.\n\nSame-day times are only offered when they start more than the configured lead time (15 minutes by default) from now.")]
    Slots {
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show whether the clinic is open right now
    Hours {
        /// Keep running and report every change until Ctrl+C
        #[arg(long)]
        watch: bool,
    },

    /// Print the summary of the saved booking
    Show,

    /// Export the saved taster as a calendar file
    #[command(long_about = "Export the saved taster as a calendar file.\n\nWrites an iCalendar (.ics) file and prints a Google Calendar link for the same 30-minute slot.")]
    Calendar {
        /// Output file (defaults to ./wellvitas-taster.ics)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Delete the saved booking
    Reset,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BookArgs {
    /// Preselect a therapy (must match one of the offered therapies)
    #[arg(long)]
    pub service: Option<String>,

    /// Prefill the name
    #[arg(long)]
    pub name: Option<String>,

    /// Prefill the email
    #[arg(long)]
    pub email: Option<String>,

    /// Prefill the phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Write the booking emails to this directory instead of calling the endpoint
    #[arg(long, value_name = "DIR")]
    pub outbox: Option<PathBuf>,

    /// Discard any saved booking and start over
    #[arg(long)]
    pub fresh: bool,
}

/// Get the command args for use in the application
pub fn parse() -> Cli {
    Cli::parse()
}
