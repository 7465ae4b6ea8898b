//! Knowledge base CLI commands: seed, add, search, stats, export, clear, reindex.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use medirag_core::knowledge::service::document_from_text;
use medirag_types::knowledge::Category;

use super::{KbCommand, print_json, truncate};
use crate::state::AppState;

pub async fn run(state: &AppState, action: KbCommand, json: bool) -> Result<()> {
    match action {
        KbCommand::Seed => seed(state, json).await,
        KbCommand::Add { file, category, tags } => add(state, &file, category, tags, json).await,
        KbCommand::Search {
            query,
            limit,
            category,
        } => search(state, &query, limit, category, json).await,
        KbCommand::Stats => stats(state, json).await,
        KbCommand::Export { path } => export(state, &path, json).await,
        KbCommand::Clear { yes } => clear(state, yes, json).await,
        KbCommand::Reindex => reindex(state, json).await,
    }
}

async fn seed(state: &AppState, json: bool) -> Result<()> {
    let spinner = super::chat::spinner("Embedding built-in documents...");
    let added = state.knowledge.seed_healthcare_data().await;
    spinner.finish_and_clear();
    let added = added?;

    if json {
        return print_json(&serde_json::json!({ "documents_added": added }));
    }
    if added == 0 {
        println!(
            "  {} Knowledge base already has documents, nothing seeded.",
            style("i").blue().bold()
        );
    } else {
        println!(
            "  {} Seeded {} healthcare documents",
            style("*").green().bold(),
            style(added).bold()
        );
    }
    Ok(())
}

async fn add(
    state: &AppState,
    file: &Path,
    category: Category,
    tags: Vec<String>,
    json: bool,
) -> Result<()> {
    let body = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let fallback_title = file
        .file_stem()
        .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_else(|| "Untitled".to_string());

    let new = document_from_text(&body, &fallback_title, category, &file.display().to_string(), tags);
    let document = state.knowledge.add_document(new).await?;

    if json {
        return print_json(&document);
    }
    println!(
        "  {} Added '{}' ({}, {} words)",
        style("*").green().bold(),
        style(&document.title).cyan(),
        document.category,
        document.word_count
    );
    println!("  {}", style(format!("id: {}", document.id)).dim());
    Ok(())
}

async fn search(
    state: &AppState,
    query: &str,
    limit: usize,
    category: Option<Category>,
    json: bool,
) -> Result<()> {
    let results = state.knowledge.search(query, limit, category).await?;

    if json {
        return print_json(&results);
    }
    if results.is_empty() {
        println!();
        println!(
            "  {} No results above the relevance threshold ({:.2}).",
            style("i").blue().bold(),
            state.knowledge.relevance_threshold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Category").fg(Color::White),
        Cell::new("Score").fg(Color::White),
        Cell::new("Excerpt").fg(Color::White),
    ]);

    for (i, result) in results.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).fg(Color::DarkGrey),
            Cell::new(&result.title).fg(Color::Cyan),
            Cell::new(result.category.as_str()).fg(Color::Magenta),
            Cell::new(format!("{:.3}", result.relevance_score)).fg(Color::Yellow),
            Cell::new(truncate(&result.content, 80)).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.knowledge.stats().await?;

    if json {
        return print_json(&stats);
    }

    println!();
    println!("  {}", style("── Knowledge base ──").dim());
    println!("  Documents:      {}", style(stats.total_documents).bold());
    println!("  Chunks:         {}", style(stats.total_chunks).bold());
    println!("  Avg chunk size: {:.0} chars", stats.average_chunk_size);
    println!(
        "  Embeddings:     {} ({}d){}",
        stats.embedding_model,
        stats.embedding_dimension,
        if stats.embedding_model_available {
            String::new()
        } else {
            format!(" {}", style("[fallback]").yellow())
        }
    );
    println!("  Threshold:      {:.2}", stats.relevance_threshold);
    println!();

    if !stats.categories.is_empty() {
        println!("  {}", style("── Chunks by category ──").dim());
        for (category, count) in &stats.categories {
            println!("  {category:<18} {count}");
        }
        println!();
    }
    Ok(())
}

async fn export(state: &AppState, path: &Path, json: bool) -> Result<()> {
    let export = state.knowledge.export().await?;
    let body = serde_json::to_string_pretty(&export)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "documents": export.documents.len(),
            "chunks": export.chunks.len(),
        }));
    }
    println!(
        "  {} Exported {} documents and {} chunks to {}",
        style("*").green().bold(),
        export.documents.len(),
        export.chunks.len(),
        style(path.display()).cyan()
    );
    Ok(())
}

async fn clear(state: &AppState, yes: bool, json: bool) -> Result<()> {
    if !yes && !json {
        let stats = state.knowledge.stats().await?;
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} documents and {} chunks? This cannot be undone.",
                style(stats.total_documents).bold(),
                style(stats.total_chunks).bold()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.knowledge.clear().await?;

    if json {
        return print_json(&serde_json::json!({ "cleared": true }));
    }
    println!("  {} Knowledge base cleared.", style("*").green().bold());
    Ok(())
}

async fn reindex(state: &AppState, json: bool) -> Result<()> {
    let spinner = super::chat::spinner("Re-embedding chunks...");
    let count = state.knowledge.reindex().await;
    spinner.finish_and_clear();
    let count = count?;

    if json {
        return print_json(&serde_json::json!({
            "chunks": count,
            "embedding_model": state.knowledge.embedding_model(),
        }));
    }
    println!(
        "  {} Reindexed {} chunks with {}",
        style("*").green().bold(),
        style(count).bold(),
        style(state.knowledge.embedding_model()).cyan()
    );
    Ok(())
}
