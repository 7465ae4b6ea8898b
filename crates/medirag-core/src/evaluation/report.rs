//! Plain-text rendering of an evaluation report.

use std::fmt::Write;

use medirag_types::evaluation::{EvaluationReport, StatSummary};

const WIDTH: usize = 80;
const RULE: usize = 40;

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn section(out: &mut String, heading: &str) {
    let _ = writeln!(out, "{heading}");
    let _ = writeln!(out, "{}", "-".repeat(RULE));
}

/// Recommendation line for an overall score.
pub fn recommendation(score: f64) -> &'static str {
    if score >= 0.8 {
        "Excellent performance. The system is ready for production."
    } else if score >= 0.6 {
        "Good performance with room for improvement."
    } else {
        "Performance needs significant improvement."
    }
}

pub fn generate_report(report: &EvaluationReport) -> String {
    let mut out = String::new();
    let banner = "=".repeat(WIDTH);

    let _ = writeln!(out, "{banner}");
    let _ = writeln!(out, "RAG SYSTEM COMPREHENSIVE EVALUATION REPORT");
    let _ = writeln!(out, "{banner}");
    let _ = writeln!(out, "Evaluation Date: {}", report.timestamp.to_rfc3339());
    let _ = writeln!(out, "Overall Score: {:.3}", report.overall_score);
    out.push('\n');

    section(&mut out, "RETRIEVAL ACCURACY METRICS");
    let accuracy = &report.retrieval_accuracy;
    let rows: [(&str, &Option<StatSummary>); 5] = [
        ("precision", &accuracy.precision),
        ("recall", &accuracy.recall),
        ("f1_score", &accuracy.f1_score),
        ("mean_reciprocal_rank", &accuracy.mean_reciprocal_rank),
        ("ndcg", &accuracy.ndcg),
    ];
    for (name, stats) in rows {
        if let Some(stats) = stats {
            let _ = writeln!(out, "{}: {:.3} (+/-{:.3})", title_case(name), stats.mean, stats.std);
        }
    }
    out.push('\n');

    section(&mut out, "LATENCY METRICS");
    if let Some(times) = &report.latency.response_times {
        let _ = writeln!(out, "Mean Response Time: {:.3}s", times.mean);
        let _ = writeln!(out, "95th Percentile: {:.3}s", times.p95);
        let _ = writeln!(out, "99th Percentile: {:.3}s", times.p99);
    }
    out.push('\n');

    section(&mut out, "RELEVANCE SCORING METRICS");
    if let Some(consistency) = &report.relevance_scoring.consistency_metrics {
        let _ = writeln!(out, "Mean Relevance Score: {:.3}", consistency.mean_score);
        let _ = writeln!(out, "Score Range: {:.3}", consistency.score_range);
    }
    out.push('\n');

    section(&mut out, "CONTEXT AWARENESS METRICS");
    let context = &report.context_awareness;
    let rows: [(&str, &Option<StatSummary>); 3] = [
        ("context_utilization", &context.context_utilization),
        ("response_relevance", &context.response_relevance),
        ("context_coherence", &context.context_coherence),
    ];
    for (name, stats) in rows {
        if let Some(stats) = stats {
            let _ = writeln!(out, "{}: {:.3}", title_case(name), stats.mean);
        }
    }
    out.push('\n');

    section(&mut out, "MEMORY EFFECTIVENESS METRICS");
    if let Some(memory) = &report.memory_effectiveness {
        let rows = [
            ("memory_utilization", memory.memory_utilization),
            ("session_memory_ratio", memory.session_memory_ratio),
            ("long_term_memory_ratio", memory.long_term_memory_ratio),
            ("active_sessions", memory.active_sessions as f64),
            ("user_profiles", memory.user_profiles as f64),
            ("memory_retention_days", memory.memory_retention_days as f64),
        ];
        for (name, value) in rows {
            let _ = writeln!(out, "{}: {value:.3}", title_case(name));
        }
    }
    out.push('\n');

    section(&mut out, "RECOMMENDATIONS");
    let _ = writeln!(out, "{}", recommendation(report.overall_score));
    out.push_str(&banner);
    out
}
