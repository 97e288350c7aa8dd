//! Terminal interaction
//!
//! `CliAdapter` implements the wizard's `InteractionAdapter` with dialoguer
//! prompts; `TerminalEffects` prints links and writes calendar files.

mod cli_adapter;
mod terminal_effects;

pub use cli_adapter::{CliAdapter, is_cancelled, setup_ctrl_c_handler};
pub use terminal_effects::TerminalEffects;
