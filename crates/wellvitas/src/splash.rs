//! Startup banner for the booking wizard
//!
//! Shows the clinic name, the open/closed badge and the address.

use std::io::{IsTerminal, Write};

use owo_colors::OwoColorize;
use wellvitas_core::{ClinicConfig, OpenStatus};

use crate::colors::{COLORS, styled_badge};

/// Leaf mark shown left of the clinic name
const MARK: &[&str] = &[" ╭─╮", " ╰─╯"];

/// Display the banner
pub fn show_splash(clinic: &ClinicConfig, status: Option<OpenStatus>) {
    let mut stdout = std::io::stdout();
    let version = env!("CARGO_PKG_VERSION");

    if !stdout.is_terminal() {
        println!("{} booking v{}", clinic.name, version);
        return;
    }

    let badge = status.map(styled_badge).unwrap_or_default();
    writeln!(
        stdout,
        "{}   {} {}  {}",
        MARK[0].style(COLORS.brand),
        clinic.name.style(COLORS.brand),
        format!("v{}", version).dimmed(),
        badge
    )
    .ok();
    writeln!(stdout, "{}   {}", MARK[1].style(COLORS.brand), clinic.address.dimmed()).ok();
    writeln!(stdout).ok();

    stdout.flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_shape() {
        assert_eq!(MARK.len(), 2);
        assert_eq!(MARK[0].chars().count(), MARK[1].chars().count());
    }
}
