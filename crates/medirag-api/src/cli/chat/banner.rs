//! Welcome banner display for chat sessions.

use console::style;

use medirag_types::knowledge::KnowledgeStats;

/// Print the welcome banner at the start of a chat session.
///
/// Shows the knowledge base size, the reply backend, the session ID and
/// the educational-use notice.
pub fn print_welcome_banner(
    stats: &KnowledgeStats,
    llm_provider: Option<&str>,
    session_id: &str,
    user_id: Option<&str>,
) {
    println!();
    println!("  {} {}", style("+").green().bold(), style("MediRAG").cyan().bold());
    println!("  {}", style("Healthcare knowledge assistant").dim());
    println!();
    println!(
        "  {}  {} documents, {} chunks",
        style("Knowledge:").bold(),
        stats.total_documents,
        stats.total_chunks
    );
    println!(
        "  {}    {}",
        style("Replies:").bold(),
        style(llm_provider.unwrap_or("templates")).dim()
    );
    println!(
        "  {}    {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    if let Some(user) = user_id {
        println!("  {}       {}", style("User:").bold(), style(user).dim());
    }
    println!();
    println!(
        "  {}",
        style("For education only. Not a substitute for professional medical advice.").yellow()
    );
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
