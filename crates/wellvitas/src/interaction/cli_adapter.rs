//! Terminal implementation of the booking wizard's prompts
//!
//! Prompts use dialoguer with a compact theme, progress uses an indicatif
//! spinner, and Ctrl+C sets a process-wide flag checked before every prompt.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use console::Style;
use dialoguer::theme::Theme;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use wellvitas_core::interaction::{
    InteractionAdapter, InteractionError, InteractionResult, ProgressHandle,
};

use crate::colors::COLORS;

/// Set when Ctrl+C was pressed
static CANCELLED: AtomicBool = AtomicBool::new(false);

pub fn is_cancelled() -> bool {
    CANCELLED.load(Ordering::SeqCst)
}

/// Install the Ctrl+C handler once per process
pub fn setup_ctrl_c_handler() {
    static HANDLER_SET: AtomicBool = AtomicBool::new(false);

    if HANDLER_SET.swap(true, Ordering::SeqCst) {
        return;
    }

    if let Err(e) = ctrlc::set_handler(move || {
        CANCELLED.store(true, Ordering::SeqCst);
        eprintln!();
    }) {
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
    }
}

/// Prompt theme: `? Prompt` lines, `›` marker on the active item
struct BookingTheme {
    prompt: Style,
    active: Style,
    hint: Style,
}

impl BookingTheme {
    fn new() -> Self {
        Self {
            prompt: Style::new().cyan().bold(),
            active: Style::new().cyan(),
            hint: Style::new().dim(),
        }
    }

    fn question(&self, f: &mut dyn FmtWrite, prompt: &str) -> std::fmt::Result {
        write!(f, "{}", self.prompt.apply_to(format!("? {}", prompt)))
    }

    fn answered(&self, f: &mut dyn FmtWrite, prompt: &str, answer: &str) -> std::fmt::Result {
        self.question(f, prompt)?;
        write!(f, " {}", self.active.apply_to(answer))
    }
}

impl Theme for BookingTheme {
    fn format_prompt(&self, f: &mut dyn FmtWrite, prompt: &str) -> std::fmt::Result {
        self.question(f, prompt)
    }

    fn format_input_prompt(
        &self,
        f: &mut dyn FmtWrite,
        prompt: &str,
        default: Option<&str>,
    ) -> std::fmt::Result {
        self.question(f, prompt)?;
        match default {
            Some(d) if !d.is_empty() => write!(f, " {}", self.hint.apply_to(format!("({})", d))),
            _ => Ok(()),
        }
    }

    fn format_input_prompt_selection(
        &self,
        f: &mut dyn FmtWrite,
        prompt: &str,
        sel: &str,
    ) -> std::fmt::Result {
        self.answered(f, prompt, sel)
    }

    fn format_confirm_prompt(
        &self,
        f: &mut dyn FmtWrite,
        prompt: &str,
        default: Option<bool>,
    ) -> std::fmt::Result {
        let hint = match default {
            Some(true) => "(Y/n)",
            Some(false) => "(y/N)",
            None => "(y/n)",
        };
        self.question(f, prompt)?;
        write!(f, " {}", self.hint.apply_to(hint))
    }

    fn format_confirm_prompt_selection(
        &self,
        f: &mut dyn FmtWrite,
        prompt: &str,
        selection: Option<bool>,
    ) -> std::fmt::Result {
        let answer = match selection {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "?",
        };
        self.answered(f, prompt, answer)
    }

    fn format_select_prompt(&self, f: &mut dyn FmtWrite, prompt: &str) -> std::fmt::Result {
        self.question(f, prompt)
    }

    fn format_select_prompt_selection(
        &self,
        f: &mut dyn FmtWrite,
        prompt: &str,
        sel: &str,
    ) -> std::fmt::Result {
        self.answered(f, prompt, sel)
    }

    fn format_select_prompt_item(
        &self,
        f: &mut dyn FmtWrite,
        text: &str,
        active: bool,
    ) -> std::fmt::Result {
        if active {
            write!(f, "  {} {}", self.active.apply_to("›"), self.active.apply_to(text))
        } else {
            write!(f, "    {}", text)
        }
    }

    fn format_multi_select_prompt(&self, f: &mut dyn FmtWrite, prompt: &str) -> std::fmt::Result {
        self.question(f, prompt)?;
        write!(f, " {}", self.hint.apply_to("(space to toggle)"))
    }

    fn format_multi_select_prompt_selection(
        &self,
        f: &mut dyn FmtWrite,
        prompt: &str,
        selections: &[&str],
    ) -> std::fmt::Result {
        let answer = if selections.is_empty() {
            "none".to_string()
        } else {
            selections.join(", ")
        };
        self.answered(f, prompt, &answer)
    }

    fn format_multi_select_prompt_item(
        &self,
        f: &mut dyn FmtWrite,
        text: &str,
        checked: bool,
        active: bool,
    ) -> std::fmt::Result {
        let checkbox = if checked { "[✓]" } else { "[ ]" };
        if active {
            write!(
                f,
                "  {} {} {}",
                self.active.apply_to("›"),
                self.active.apply_to(checkbox),
                self.active.apply_to(text)
            )
        } else {
            write!(f, "    {} {}", checkbox, text)
        }
    }
}

/// Dialoguer-backed adapter
pub struct CliAdapter {
    is_tty: bool,
    progress_counter: AtomicU64,
    active_progress: Arc<Mutex<HashMap<u64, ProgressBar>>>,
}

impl CliAdapter {
    pub fn new() -> Self {
        Self::with_tty(std::io::stdin().is_terminal())
    }

    pub fn with_tty(is_tty: bool) -> Self {
        setup_ctrl_c_handler();
        Self {
            is_tty,
            progress_counter: AtomicU64::new(0),
            active_progress: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    fn ready(&self) -> InteractionResult<()> {
        if !self.is_tty {
            return Err(InteractionError::NonTty);
        }
        if is_cancelled() {
            return Err(InteractionError::Cancelled);
        }
        Ok(())
    }

    fn convert(err: dialoguer::Error) -> InteractionError {
        // Ctrl+C during a prompt surfaces as an interrupted read
        if is_cancelled() {
            return InteractionError::Cancelled;
        }
        InteractionError::Io(err.to_string())
    }
}

impl Default for CliAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionAdapter for CliAdapter {
    fn ask_text(&self, prompt: &str, default: Option<&str>) -> InteractionResult<String> {
        self.ready()?;

        let theme = BookingTheme::new();
        let mut input: Input<String> = Input::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(d) = default {
            input = input.default(d.to_string()).show_default(false);
        }
        input.interact_text().map_err(Self::convert)
    }

    fn ask_select(&self, prompt: &str, options: &[&str], default: usize) -> InteractionResult<usize> {
        self.ready()?;
        if options.is_empty() {
            return Err(InteractionError::InvalidInput(
                "options cannot be empty".to_string(),
            ));
        }

        let theme = BookingTheme::new();
        Select::with_theme(&theme)
            .with_prompt(prompt)
            .items(options)
            .default(default.min(options.len() - 1))
            .interact()
            .map_err(Self::convert)
    }

    fn ask_confirm(&self, prompt: &str, default: bool) -> InteractionResult<bool> {
        self.ready()?;

        let theme = BookingTheme::new();
        Confirm::with_theme(&theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(Self::convert)
    }

    fn ask_multi_select(
        &self,
        prompt: &str,
        options: &[&str],
        checked: &[bool],
    ) -> InteractionResult<Vec<usize>> {
        self.ready()?;
        if options.is_empty() {
            return Err(InteractionError::InvalidInput(
                "options cannot be empty".to_string(),
            ));
        }

        let theme = BookingTheme::new();
        MultiSelect::with_theme(&theme)
            .with_prompt(prompt)
            .items(options)
            .defaults(checked)
            .interact()
            .map_err(Self::convert)
    }

    fn start_progress(&self, message: &str) -> ProgressHandle {
        let id = self.progress_counter.fetch_add(1, Ordering::SeqCst);

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut progress) = self.active_progress.lock() {
            progress.insert(id, pb);
        }
        ProgressHandle::new(id, message)
    }

    fn end_progress(&self, handle: ProgressHandle, success: bool) {
        let Ok(mut progress) = self.active_progress.lock() else {
            return;
        };
        if let Some(pb) = progress.remove(&handle.id()) {
            let elapsed = format!("{:.1}s", pb.elapsed().as_secs_f64());
            pb.finish_and_clear();
            if success {
                println!("{} {} [{}]", "✓".green(), handle.message().green(), elapsed);
            } else {
                println!("{} {} [{}]", "✗".red(), handle.message().red(), elapsed);
            }
        }
    }

    fn print_info(&self, message: &str) {
        println!("{}", message);
        let _ = std::io::stdout().flush();
    }

    fn print_warning(&self, message: &str) {
        println!("{} {}", "!".yellow().bold(), message.yellow());
        let _ = std::io::stdout().flush();
    }

    fn print_error(&self, message: &str) {
        eprintln!("{} {}", "✗".style(COLORS.fail), message.style(COLORS.fail));
        let _ = std::io::stderr().flush();
    }

    fn print_success(&self, message: &str) {
        println!("{} {}", "✓".green(), message.green());
        let _ = std::io::stdout().flush();
    }

    fn print_header(&self, message: &str) {
        println!();
        println!("{}", message.style(COLORS.brand));
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tty_override() {
        assert!(CliAdapter::with_tty(true).is_tty());
        assert!(!CliAdapter::with_tty(false).is_tty());
    }

    #[test]
    fn test_prompts_need_a_terminal() {
        let adapter = CliAdapter::with_tty(false);
        assert!(matches!(adapter.ask_text("Name", None), Err(InteractionError::NonTty)));
        assert!(matches!(
            adapter.ask_select("Time", &["16:00"], 0),
            Err(InteractionError::NonTty)
        ));
        assert!(matches!(adapter.ask_confirm("Agree?", false), Err(InteractionError::NonTty)));
        assert!(matches!(
            adapter.ask_multi_select("Therapies", &["a"], &[false]),
            Err(InteractionError::NonTty)
        ));
    }

    #[test]
    fn test_progress_ids_are_unique() {
        let adapter = CliAdapter::with_tty(false);
        let first = adapter.start_progress("Sending");
        let second = adapter.start_progress("Sending again");
        assert_ne!(first.id(), second.id());
        assert_eq!(first.message(), "Sending");
        adapter.end_progress(first, true);
        adapter.end_progress(second, false);
    }

    #[test]
    fn test_theme_renders_answer() {
        let theme = BookingTheme::new();
        let mut out = String::new();
        theme
            .format_multi_select_prompt_selection(&mut out, "Therapies", &[])
            .unwrap();
        assert!(out.contains("Therapies"));
        assert!(out.contains("none"));
    }
}
