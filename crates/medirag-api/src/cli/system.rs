//! System-wide commands: stats dashboard, performance, export, reset.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;

use super::print_json;
use crate::state::AppState;

/// Display the system status dashboard.
///
/// Shows knowledge and memory counts, recorded response metrics, and the
/// active configuration.
pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.rag.system_stats().await?;

    if json {
        return print_json(&stats);
    }

    let config = &stats.system_configuration;
    println!();
    println!("  {} MediRAG v{}", style("+").green().bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Knowledge ──").dim());
    println!("  Documents: {}", style(stats.knowledge_stats.total_documents).bold());
    println!("  Chunks:    {}", style(stats.knowledge_stats.total_chunks).bold());
    println!();

    println!("  {}", style("── Memory ──").dim());
    println!("  Memories:  {}", style(stats.memory_stats.total_memories).bold());
    println!("  Sessions:  {}", stats.memory_stats.active_sessions);
    println!("  Profiles:  {}", stats.memory_stats.user_profiles);
    println!();

    println!("  {}", style("── Responses ──").dim());
    println!("  Total:          {}", stats.evaluation_metrics.total_responses);
    println!(
        "  Avg time:       {:.2}s",
        stats.evaluation_metrics.average_response_time
    );
    println!(
        "  Avg relevance:  {:.3}",
        stats.evaluation_metrics.average_knowledge_relevance
    );
    println!();

    println!("  {}", style("── System ──").dim());
    println!(
        "  Embeddings: {}",
        if config.embedding_model_available {
            style(stats.knowledge_stats.embedding_model.as_str()).green()
        } else {
            style("hashing fallback").yellow()
        }
    );
    println!(
        "  LLM:        {}",
        match &config.llm_provider {
            Some(name) => style(name.as_str()).green(),
            None => style("none (template replies)").yellow(),
        }
    );
    println!("  Context:    {} chars", config.max_context_length);
    println!("  Timeout:    {}s", config.response_timeout_secs);
    println!("  Data dir:   {}", style(state.data_dir.display()).dim());
    println!();
    Ok(())
}

pub async fn performance(state: &AppState, json: bool) -> Result<()> {
    let performance = state.rag.evaluate_system_performance().await?;

    if json {
        return print_json(&performance);
    }

    let Some(perf) = performance else {
        println!();
        println!(
            "  {} No responses recorded yet. Try `medirag ask` first.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    };

    println!();
    println!("  {}", style("── Latency ──").dim());
    println!("  Mean: {:.3}s", perf.latency.average_response_time);
    println!(
        "  Min:  {:.3}s   Max: {:.3}s   Std: {:.3}s",
        perf.latency.min_response_time, perf.latency.max_response_time, perf.latency.response_time_std
    );
    println!();
    println!("  {}", style("── Retrieval ──").dim());
    println!(
        "  Mean relevance: {:.3} (std {:.3})",
        perf.retrieval_accuracy.average_knowledge_relevance,
        perf.retrieval_accuracy.knowledge_relevance_std
    );
    println!(
        "  High relevance: {} replies",
        perf.retrieval_accuracy.high_relevance_responses
    );
    println!();
    println!("  {}", style("── Utilization ──").dim());
    println!("  Responses:          {}", perf.system_utilization.total_responses);
    println!(
        "  Memory utilization: {:.1}%",
        perf.system_utilization.memory_utilization_rate * 100.0
    );
    println!(
        "  Knowledge coverage: {:.1}%",
        perf.system_utilization.knowledge_coverage * 100.0
    );
    println!();
    Ok(())
}

pub async fn export(state: &AppState, path: &Path, json: bool) -> Result<()> {
    let export = state.rag.export_system_data().await?;
    tokio::fs::write(path, serde_json::to_string_pretty(&export)?)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "documents": export.knowledge_export.documents.len(),
            "response_metrics": export.response_metrics.len(),
        }));
    }
    println!(
        "  {} System data exported to {}",
        style("*").green().bold(),
        style(path.display()).cyan()
    );
    Ok(())
}

pub async fn reset(state: &AppState, yes: bool, json: bool) -> Result<()> {
    if !yes && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} memories, knowledge and metrics? This cannot be undone.",
                style("ALL").red().bold()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.rag.clear_system_data().await?;

    if json {
        return print_json(&serde_json::json!({ "cleared": true }));
    }
    println!("  {} All system data cleared.", style("*").green().bold());
    Ok(())
}
