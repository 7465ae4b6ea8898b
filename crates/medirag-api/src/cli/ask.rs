//! One-shot question command.

use anyhow::Result;
use console::style;
use uuid::Uuid;

use super::chat::renderer::ChatRenderer;
use super::print_json;
use crate::state::AppState;

pub async fn ask(
    state: &AppState,
    message: &str,
    session: Option<String>,
    user: Option<String>,
    json: bool,
) -> Result<()> {
    state.ensure_knowledge().await?;

    let session_id = session.unwrap_or_else(|| Uuid::now_v7().to_string());
    let spinner = (!json).then(|| super::chat::spinner("thinking..."));
    let reply = state
        .rag
        .generate_response(message, &session_id, user.as_deref())
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        return print_json(&reply);
    }

    let renderer = ChatRenderer::new();
    println!();
    println!("{}", renderer.render_final(&reply.response));
    renderer.print_reply_footer(&reply);
    if !reply.knowledge_sources.is_empty() {
        println!(
            "  {} {}",
            style("Sources:").dim(),
            style(reply.knowledge_sources.join(", ")).dim()
        );
    }
    println!("  {}", style(format!("session: {session_id}")).dim());
    println!();
    Ok(())
}
