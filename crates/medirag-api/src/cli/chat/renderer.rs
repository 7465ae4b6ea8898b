//! Markdown rendering for assistant replies.
//!
//! `ChatRenderer` renders reply text through `termimad` and prints a dim
//! footer describing how the reply was produced.

use console::style;
use termimad::MadSkin;
use termimad::crossterm::style::Color;

use medirag_types::chat::{ChatReply, GeneratedBy, ResponseStyle};

pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(Color::Cyan);
        skin.headers[0].set_fg(Color::Cyan);
        skin.headers[1].set_fg(Color::Cyan);
        skin.inline_code.set_fg(Color::Yellow);
        Self { skin }
    }

    /// Render a complete markdown reply for the terminal, indented two spaces.
    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        for line in markdown.lines() {
            if line.trim().is_empty() {
                output.push('\n');
                continue;
            }
            let rendered = self.skin.term_text(line).to_string();
            output.push_str("  ");
            output.push_str(rendered.trim_end());
            output.push('\n');
        }
        output.trim_end().to_string()
    }

    /// Print the style, origin, source count and latency of a reply.
    pub fn print_reply_footer(&self, reply: &ChatReply) {
        let style_label = match reply.response_style {
            ResponseStyle::Urgent => style(reply.response_style.to_string()).red().bold(),
            _ => style(reply.response_style.to_string()).dim(),
        };
        let origin = match reply.generated_by {
            GeneratedBy::Error => style(reply.generated_by.to_string()).red(),
            _ => style(reply.generated_by.to_string()).dim(),
        };

        println!();
        println!(
            "  {} {} {} {} {}",
            style("[").dim(),
            style_label,
            style(format!("| {origin} | {} sources |", reply.knowledge_sources.len())).dim(),
            style(format!("{:.2}s", reply.response_time_secs)).dim(),
            style("]").dim(),
        );
        if let Some(error) = &reply.error {
            println!("  {} {}", style("!").yellow().bold(), style(error).dim());
        }
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}
