//! CLI command definitions and dispatch for the `medirag` binary.
//!
//! Uses clap derive macros for argument parsing. Commands are grouped by
//! noun (`medirag kb search`, `medirag memory profile`).

pub mod ask;
pub mod chat;
pub mod evaluate;
pub mod kb;
pub mod memory;
pub mod system;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use medirag_types::knowledge::Category;

/// Healthcare knowledge assistant with retrieval and conversation memory.
#[derive(Parser)]
#[command(name = "medirag", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Data directory (database, vectors, config.toml).
    #[arg(long, global = true, env = "MEDIRAG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat {
        /// Resume a session by ID (a new one is created otherwise).
        #[arg(long)]
        session: Option<String>,

        /// User ID for profile-aware replies and long-term memory.
        #[arg(long)]
        user: Option<String>,
    },

    /// Ask a single question and print the reply.
    Ask {
        /// The message to send.
        message: String,

        #[arg(long)]
        session: Option<String>,

        #[arg(long)]
        user: Option<String>,
    },

    /// Manage the knowledge base.
    Kb {
        #[command(subcommand)]
        action: KbCommand,
    },

    /// Inspect and maintain conversation memory.
    Memory {
        #[command(subcommand)]
        action: MemoryCommand,
    },

    /// Run the retrieval evaluation suite.
    Evaluate {
        /// Write the report, test queries and ground truth as JSON.
        #[arg(long)]
        export: Option<PathBuf>,

        /// List past evaluation runs instead of running a new one.
        #[arg(long, conflicts_with = "clear_history")]
        history: bool,

        /// Delete past evaluation runs.
        #[arg(long)]
        clear_history: bool,
    },

    /// System statistics (memory, knowledge, response metrics).
    Stats,

    /// Latency and retrieval performance over recorded replies.
    Performance,

    /// Export all system data as JSON.
    Export {
        /// Output file.
        path: PathBuf,
    },

    /// Delete all memory, knowledge and recorded metrics.
    Reset {
        /// Skip confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `server.port` from config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum KbCommand {
    /// Load the built-in healthcare dataset (only into an empty knowledge base).
    Seed,

    /// Add a text or markdown file as a document.
    Add {
        /// File to ingest.
        file: PathBuf,

        /// Document category.
        #[arg(long, default_value = "general", value_parser = parse_category)]
        category: Category,

        /// Tag (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Search the knowledge base.
    Search {
        query: String,

        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Prefer results from this category.
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },

    /// Document, chunk and category counts.
    Stats,

    /// Export documents and chunks as JSON.
    Export { path: PathBuf },

    /// Delete every document and chunk.
    Clear {
        #[arg(long)]
        yes: bool,
    },

    /// Re-embed all chunks with the current embedder.
    Reindex,
}

#[derive(Subcommand)]
pub enum MemoryCommand {
    /// Memory counts and retention settings.
    Stats,

    /// Turns and summary of one session.
    Session { id: String },

    /// A user's profile and derived insights.
    Profile { user: String },

    /// Export all memory as JSON.
    Export { path: PathBuf },

    /// Import memory from a JSON export (merges by entry id).
    Import { path: PathBuf },

    /// Delete entries older than the retention window.
    Cleanup,

    /// Delete all data of a user (`all` deletes everything).
    Forget {
        user: String,

        #[arg(long)]
        yes: bool,
    },
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

/// Shorten `text` to `max` chars, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_kb_add_with_tags() {
        let cli = Cli::try_parse_from([
            "medirag", "kb", "add", "notes.md", "--category", "treatment", "--tag", "asthma", "--tag",
            "inhaler",
        ])
        .unwrap();
        match cli.command {
            Commands::Kb {
                action: KbCommand::Add { file, category, tags },
            } => {
                assert_eq!(file, PathBuf::from("notes.md"));
                assert_eq!(category, Category::Treatment);
                assert_eq!(tags, vec!["asthma", "inhaler"]);
            }
            _ => panic!("expected kb add"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        assert!(Cli::try_parse_from(["medirag", "kb", "search", "flu", "--category", "astrology"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["medirag", "stats", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence here", 10), "a longe...");
    }
}
