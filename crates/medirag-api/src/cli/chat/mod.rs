//! Interactive CLI chat experience for MediRAG.
//!
//! This module implements the chat loop: markdown rendering of replies,
//! a thinking spinner, the welcome banner, and slash commands for session
//! history, summaries, profiles and sources. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// A steady-ticking spinner with a message, cleared by the caller.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
