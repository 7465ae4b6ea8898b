//! Evaluation CLI command: run the suite, list history, clear history.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use medirag_core::evaluation::report::{generate_report, recommendation};
use medirag_types::evaluation::EvaluationReport;

use super::print_json;
use crate::state::AppState;

pub async fn run(
    state: &AppState,
    export: Option<&Path>,
    history: bool,
    clear_history: bool,
    json: bool,
) -> Result<()> {
    if clear_history {
        let removed = state.evaluator.clear_history().await?;
        if json {
            return print_json(&serde_json::json!({ "removed": removed }));
        }
        println!("  {} Removed {} evaluation runs", style("*").green().bold(), removed);
        return Ok(());
    }

    if history {
        return show_history(state, json).await;
    }

    state.ensure_knowledge().await?;

    let spinner = super::chat::spinner("Running evaluation suite...");
    let report = state
        .evaluator
        .run_comprehensive_evaluation(&*state.knowledge, &*state.memory)
        .await;
    spinner.finish_and_clear();
    let report = report?;

    if let Some(path) = export {
        let bundle = state.evaluator.export(report.clone());
        tokio::fs::write(path, serde_json::to_string_pretty(&bundle)?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !json {
            println!(
                "  {} Evaluation exported to {}",
                style("*").green().bold(),
                style(path.display()).cyan()
            );
        }
    }

    if json {
        return print_json(&report);
    }
    println!("{}", generate_report(&report));
    Ok(())
}

async fn show_history(state: &AppState, json: bool) -> Result<()> {
    let runs = state.evaluator.history().await?;

    if json {
        return print_json(&runs);
    }
    if runs.is_empty() {
        println!();
        println!(
            "  {} No evaluation runs yet. Run `medirag evaluate`.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Date").fg(Color::White),
        Cell::new("Overall").fg(Color::White),
        Cell::new("F1").fg(Color::White),
        Cell::new("Mean latency").fg(Color::White),
        Cell::new("Assessment").fg(Color::White),
    ]);

    for run in &runs {
        table.add_row(vec![
            Cell::new(run.timestamp.format("%Y-%m-%d %H:%M")).fg(Color::DarkGrey),
            Cell::new(format!("{:.3}", run.overall_score)).fg(score_color(run.overall_score)),
            Cell::new(f1_mean(run)).fg(Color::White),
            Cell::new(latency_mean(run)).fg(Color::White),
            Cell::new(recommendation(run.overall_score)).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

fn score_color(score: f64) -> Color {
    if score >= 0.8 {
        Color::Green
    } else if score >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn f1_mean(report: &EvaluationReport) -> String {
    report
        .retrieval_accuracy
        .f1_score
        .as_ref()
        .map(|s| format!("{:.3}", s.mean))
        .unwrap_or_else(|| "-".to_string())
}

fn latency_mean(report: &EvaluationReport) -> String {
    report
        .latency
        .response_times
        .as_ref()
        .map(|s| format!("{:.1} ms", s.mean * 1000.0))
        .unwrap_or_else(|| "-".to_string())
}
