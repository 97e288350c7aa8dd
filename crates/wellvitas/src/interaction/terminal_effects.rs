//! Effects for a terminal session
//!
//! A terminal cannot open WhatsApp or a mail client itself, so links are
//! printed for the user to follow. Calendar files are written to disk.

use std::fs;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use wellvitas_core::BookingError;
use wellvitas_core::calendar::CalendarFile;
use wellvitas_core::effects::Effects;

use crate::colors::COLORS;

pub struct TerminalEffects {
    download_dir: PathBuf,
    echo: bool,
    opened: Vec<String>,
    written: Vec<PathBuf>,
}

impl TerminalEffects {
    /// `echo = false` collects links without printing (JSON mode)
    pub fn new(download_dir: &Path, echo: bool) -> Self {
        Self {
            download_dir: download_dir.to_path_buf(),
            echo,
            opened: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn opened(&self) -> &[String] {
        &self.opened
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

fn link_label(url: &str) -> &'static str {
    if url.starts_with("https://wa.me/") {
        "WhatsApp"
    } else if url.starts_with("mailto:") {
        "Email"
    } else if url.starts_with("https://calendar.google.com/") {
        "Google Calendar"
    } else {
        "Link"
    }
}

impl Effects for TerminalEffects {
    fn open_url(&mut self, url: &str) {
        tracing::debug!(label = link_label(url), "handing link to the user");
        if self.echo {
            println!("{:>16}: {}", link_label(url).bold(), url.style(COLORS.link));
        }
        self.opened.push(url.to_string());
    }

    fn offer_download(&mut self, file: &CalendarFile) -> Result<(), BookingError> {
        fs::create_dir_all(&self.download_dir)?;
        let path = self.download_dir.join(&file.filename);
        fs::write(&path, &file.contents)?;
        if self.echo {
            println!("Saved calendar file to {}", path.display());
        }
        self.written.push(path);
        Ok(())
    }
}
