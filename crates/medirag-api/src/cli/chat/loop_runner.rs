//! Main chat loop orchestration.
//!
//! Seeds the knowledge base when empty, prints the banner, then reads
//! lines until EOF. Slash commands are handled locally; everything else
//! goes through the RAG pipeline and is rendered as markdown.

use console::style;
use uuid::Uuid;

use medirag_types::chat::ChatReply;

use crate::cli::truncate;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;
use super::spinner;

fn prompt_for(session_id: &str) -> String {
    format!(
        "  {} {} ",
        style(format!("[{}]", &session_id[..8.min(session_id.len())])).dim(),
        style("You >").green().bold()
    )
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(
    state: &AppState,
    session: Option<String>,
    user: Option<String>,
) -> anyhow::Result<()> {
    let seed_spinner = spinner("Preparing knowledge base...");
    let seeded = state.ensure_knowledge().await;
    seed_spinner.finish_and_clear();
    seeded?;

    let mut session_id = session.unwrap_or_else(|| Uuid::now_v7().to_string());
    let user_id = user;

    let stats = state.knowledge.stats().await?;
    print_welcome_banner(
        &stats,
        state.rag.llm_provider(),
        &session_id,
        user_id.as_deref(),
    );

    let renderer = ChatRenderer::new();
    let mut last_reply: Option<ChatReply> = None;

    let (mut chat_input, _writer) = ChatInput::new(prompt_for(&session_id))
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }
                ChatCommand::New => {
                    session_id = Uuid::now_v7().to_string();
                    last_reply = None;
                    chat_input.update_prompt(&prompt_for(&session_id));
                    println!(
                        "\n  {} New session {}\n",
                        style("*").green().bold(),
                        style(&session_id).cyan()
                    );
                }
                ChatCommand::History => print_history(state, &session_id).await,
                ChatCommand::Summary => print_summary(state, &session_id).await,
                ChatCommand::Profile => print_profile(state, user_id.as_deref()).await,
                ChatCommand::Sources => print_sources(last_reply.as_ref()),
                ChatCommand::Unknown(name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(name).dim()
                    );
                }
            }
            continue;
        }

        let thinking = spinner("thinking...");
        let reply = state
            .rag
            .generate_response(&text, &session_id, user_id.as_deref())
            .await;
        thinking.finish_and_clear();

        println!();
        println!("  {}", style("MediRAG").cyan().bold());
        println!("{}", renderer.render_final(&reply.response));
        renderer.print_reply_footer(&reply);
        println!();

        last_reply = Some(reply);
    }

    chat_input.flush();
    tracing::debug!(session_id = %session_id, "Chat loop finished");
    Ok(())
}

async fn print_history(state: &AppState, session_id: &str) {
    let entries = match state.memory.get_session_history(session_id).await {
        Ok(entries) => entries,
        Err(e) => {
            println!("\n  {} Failed to load history: {e}\n", style("!").red().bold());
            return;
        }
    };

    println!();
    if entries.is_empty() {
        println!("  {}", style("No turns in this session yet.").dim());
    }
    for entry in &entries {
        println!(
            "  {} {}",
            style("You").green().bold(),
            truncate(&entry.user_message, 100)
        );
        println!(
            "  {} {}",
            style("MediRAG").cyan().bold(),
            style(truncate(&entry.assistant_response, 100)).dim()
        );
    }
    println!();
}

async fn print_summary(state: &AppState, session_id: &str) {
    match state.memory.get_conversation_summary(session_id).await {
        Ok(Some(summary)) => {
            println!();
            println!("  {}", style("── Session summary ──").dim());
            println!("  Turns:     {}", summary.total_turns);
            println!("  Duration:  {} min", summary.duration_minutes);
            println!("  Sentiment: {:+.2}", summary.average_sentiment);
            if !summary.main_topics.is_empty() {
                let topics: Vec<String> = summary
                    .main_topics
                    .iter()
                    .map(|(topic, count)| format!("{topic} ({count})"))
                    .collect();
                println!("  Topics:    {}", topics.join(", "));
            }
            println!();
        }
        Ok(None) => println!("\n  {}\n", style("No turns in this session yet.").dim()),
        Err(e) => println!("\n  {} Failed to summarize: {e}\n", style("!").red().bold()),
    }
}

async fn print_profile(state: &AppState, user_id: Option<&str>) {
    let Some(user_id) = user_id else {
        println!(
            "\n  {} Start the chat with --user <id> to build a profile.\n",
            style("i").blue().bold()
        );
        return;
    };

    match state.memory.get_user_profile(user_id).await {
        Ok(view) if view.stored => {
            println!();
            println!("  Profile for '{}'", style(user_id).cyan().bold());
            println!(
                "  Conversations: {}  Messages: {}",
                view.profile.total_conversations, view.profile.total_messages
            );
            println!("  Style:         {:?}", view.insights.conversation_style);
            if !view.insights.top_interests.is_empty() {
                let interests: Vec<&str> = view
                    .insights
                    .top_interests
                    .iter()
                    .map(|(topic, _)| topic.as_str())
                    .collect();
                println!("  Interests:     {}", interests.join(", "));
            }
            println!();
        }
        Ok(_) => println!("\n  {}\n", style("No profile stored yet.").dim()),
        Err(e) => println!("\n  {} Failed to load profile: {e}\n", style("!").red().bold()),
    }
}

fn print_sources(last_reply: Option<&ChatReply>) {
    let sources = last_reply.map(|r| r.knowledge_sources.as_slice()).unwrap_or_default();
    println!();
    if sources.is_empty() {
        println!("  {}", style("No knowledge sources for the last reply.").dim());
    }
    for (i, source) in sources.iter().enumerate() {
        println!("  {} {}", style(format!("{}.", i + 1)).dim(), style(source).cyan());
    }
    println!();
}
