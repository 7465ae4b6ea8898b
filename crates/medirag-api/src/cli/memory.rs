//! Memory CLI commands: stats, session, profile, export, import, cleanup, forget.
//!
//! Session browsing with a per-turn table, profile insights, JSON backup
//! and restore, retention cleanup, and per-user deletion with confirmation.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use medirag_core::memory::manager::ALL_USERS;
use medirag_types::memory::{MemoryExport, MemoryType, Sentiment};

use super::{MemoryCommand, print_json, truncate};
use crate::state::AppState;

pub async fn run(state: &AppState, action: MemoryCommand, json: bool) -> Result<()> {
    match action {
        MemoryCommand::Stats => stats(state, json).await,
        MemoryCommand::Session { id } => session(state, &id, json).await,
        MemoryCommand::Profile { user } => profile(state, &user, json).await,
        MemoryCommand::Export { path } => export(state, &path, json).await,
        MemoryCommand::Import { path } => import(state, &path, json).await,
        MemoryCommand::Cleanup => cleanup(state, json).await,
        MemoryCommand::Forget { user, yes } => forget(state, &user, yes, json).await,
    }
}

async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.memory.stats().await?;

    if json {
        return print_json(&stats);
    }

    println!();
    println!("  {}", style("── Memory ──").dim());
    println!("  Session memories:   {}", style(stats.session_memories).bold());
    println!("  Long-term memories: {}", style(stats.long_term_memories).bold());
    println!("  Active sessions:    {}", stats.active_sessions);
    println!("  User profiles:      {}", stats.user_profiles);
    println!("  Retention:          {} days", stats.memory_retention_days);
    println!();
    Ok(())
}

/// Show every turn of a session followed by its summary.
///
/// # Examples
///
/// ```bash
/// medirag memory session 0190f3c2-...
/// medirag memory session 0190f3c2-... --json
/// ```
async fn session(state: &AppState, session_id: &str, json: bool) -> Result<()> {
    let entries = state.memory.get_session_history(session_id).await?;
    let summary = state.memory.get_conversation_summary(session_id).await?;

    if json {
        return print_json(&serde_json::json!({
            "session_id": session_id,
            "turns": entries,
            "summary": summary,
        }));
    }

    let Some(summary) = summary else {
        println!();
        println!(
            "  {} No turns stored for session '{}'.",
            style("i").blue().bold(),
            style(session_id).cyan()
        );
        println!();
        return Ok(());
    };

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("User").fg(Color::White),
        Cell::new("Assistant").fg(Color::White),
        Cell::new("Sentiment").fg(Color::White),
        Cell::new("Relevance").fg(Color::White),
    ]);

    for entry in &entries {
        let sentiment = match entry.sentiment {
            Sentiment::Positive => Cell::new("positive").fg(Color::Green),
            Sentiment::Negative => Cell::new("negative").fg(Color::Red),
            Sentiment::Neutral => Cell::new("neutral").fg(Color::DarkGrey),
        };
        let relevance = if entry.memory_type == MemoryType::LongTerm {
            format!("{:.2} *", entry.relevance_score)
        } else {
            format!("{:.2}", entry.relevance_score)
        };
        table.add_row(vec![
            Cell::new(entry.timestamp.format("%H:%M:%S")).fg(Color::DarkGrey),
            Cell::new(truncate(&entry.user_message, 50)).fg(Color::White),
            Cell::new(truncate(&entry.assistant_response, 60)).fg(Color::White),
            sentiment,
            Cell::new(relevance).fg(Color::Yellow),
        ]);
    }

    println!();
    println!("  Session '{}'", style(session_id).cyan().bold());
    println!();
    println!("{table}");
    println!();
    println!("  {}", style("── Summary ──").dim());
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
    Ok(())
}

async fn profile(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let view = state.memory.get_user_profile(user_id).await?;

    if json {
        return print_json(&view);
    }

    println!();
    if !view.stored {
        println!(
            "  {} No conversations stored for '{}' yet.",
            style("i").blue().bold(),
            style(user_id).cyan()
        );
        println!();
        return Ok(());
    }

    let profile = &view.profile;
    println!("  Profile for '{}'", style(user_id).cyan().bold());
    println!();
    println!("  {}", style("── Activity ──").dim());
    println!("  Conversations: {}", profile.total_conversations);
    println!("  Messages:      {}", profile.total_messages);
    println!(
        "  Last seen:     {}",
        profile.last_interaction.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "  Sentiment:     {} positive, {} neutral, {} negative",
        style(profile.sentiment_distribution.positive).green(),
        profile.sentiment_distribution.neutral,
        style(profile.sentiment_distribution.negative).red()
    );
    println!();

    println!("  {}", style("── Insights ──").dim());
    println!("  Style:         {:?}", view.insights.conversation_style);
    if let Some(personality) = &view.insights.personality {
        println!("  Optimism:      {:?}", personality.optimism_level);
        println!("  Engagement:    {:?}", personality.engagement_level);
        println!("  Health focus:  {:?}", personality.health_consciousness);
    }
    if !view.insights.top_interests.is_empty() {
        let interests: Vec<String> = view
            .insights
            .top_interests
            .iter()
            .map(|(topic, count)| format!("{topic} ({count})"))
            .collect();
        println!("  Interests:     {}", interests.join(", "));
    }
    println!();
    Ok(())
}

async fn export(state: &AppState, path: &Path, json: bool) -> Result<()> {
    let export = state.memory.export().await?;
    let session_entries: usize = export.session_memories.values().map(Vec::len).sum();
    tokio::fs::write(path, serde_json::to_string_pretty(&export)?)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "session_memories": session_entries,
            "long_term_memories": export.long_term_memories.len(),
            "user_profiles": export.user_profiles.len(),
        }));
    }
    println!(
        "  {} Exported {} session and {} long-term memories, {} profiles to {}",
        style("*").green().bold(),
        session_entries,
        export.long_term_memories.len(),
        export.user_profiles.len(),
        style(path.display()).cyan()
    );
    Ok(())
}

async fn import(state: &AppState, path: &Path, json: bool) -> Result<()> {
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data: MemoryExport = serde_json::from_str(&body)
        .with_context(|| format!("{} is not a memory export", path.display()))?;

    let counts = state.memory.import(data).await?;

    if json {
        return print_json(&counts);
    }
    println!(
        "  {} Imported {} session and {} long-term memories, {} profiles",
        style("*").green().bold(),
        counts.session_memories,
        counts.long_term_memories,
        counts.user_profiles
    );
    Ok(())
}

async fn cleanup(state: &AppState, json: bool) -> Result<()> {
    let removed = state.memory.cleanup_old_memories().await?;

    if json {
        return print_json(&serde_json::json!({
            "removed": removed,
            "retention_days": state.config.memory.retention_days,
        }));
    }
    println!(
        "  {} Removed {} memories older than {} days",
        style("*").green().bold(),
        style(removed).bold(),
        state.config.memory.retention_days
    );
    Ok(())
}

/// Delete a user's memories and profile with confirmation.
///
/// # Examples
///
/// ```bash
/// medirag memory forget alice
/// medirag memory forget all --yes
/// ```
async fn forget(state: &AppState, user_id: &str, yes: bool, json: bool) -> Result<()> {
    if !yes && !json {
        let target = if user_id == ALL_USERS {
            "ALL users".to_string()
        } else {
            format!("'{user_id}'")
        };
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all memories and profile data of {}? This cannot be undone.",
                style(target).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let deleted = state.memory.clear_user_data(user_id).await?;

    if json {
        return print_json(&serde_json::json!({ "deleted": deleted, "user": user_id }));
    }
    println!(
        "  {} Deleted {} memories for {}",
        style("*").green().bold(),
        style(deleted).bold(),
        style(user_id).cyan()
    );
    Ok(())
}
