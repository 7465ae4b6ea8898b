//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and give in-chat access to session history,
//! summaries, the user profile and the sources of the last reply.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Start a fresh session (new session ID).
    New,
    /// Show the turns stored for this session.
    History,
    /// Show the conversation summary.
    Summary,
    /// Show the user profile (needs `--user`).
    Profile,
    /// Show knowledge sources of the last reply.
    Sources,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/new" => ChatCommand::New,
        "/history" => ChatCommand::History,
        "/summary" => ChatCommand::Summary,
        "/profile" => ChatCommand::Profile,
        "/sources" => ChatCommand::Sources,
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// Print the help text listing all available commands.
pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat session"),
        ("/new", "Start a new session"),
        ("/history", "Show this session's turns"),
        ("/summary", "Summarize this session"),
        ("/profile", "Show your profile (needs --user)"),
        ("/sources", "Sources used for the last reply"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (name, description) in rows {
        println!("  {:<10} {}", style(name).cyan(), description);
    }
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
