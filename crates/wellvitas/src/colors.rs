//! Terminal colour roles
//!
//! `brand` for headings and the banner, `open`/`closed` for the hours badge,
//! `link` for printed URLs, `fail` for errors.

use std::sync::LazyLock;

use owo_colors::{OwoColorize, Style};
use wellvitas_core::OpenStatus;

pub struct Palette {
    pub brand: Style,
    pub open: Style,
    pub closed: Style,
    pub link: Style,
    pub fail: Style,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            brand: Style::new().cyan().bold(),
            open: Style::new().green().bold(),
            closed: Style::new().yellow(),
            link: Style::new().blue().underline(),
            fail: Style::new().red().bold(),
        }
    }
}

pub static COLORS: LazyLock<Palette> = LazyLock::new(Palette::default);

/// Badge text styled for its status
pub fn styled_badge(status: OpenStatus) -> String {
    let style = if status.is_open() {
        COLORS.open
    } else {
        COLORS.closed
    };
    status.badge().style(style).to_string()
}
