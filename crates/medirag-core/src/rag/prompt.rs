//! System prompt and request construction for model-generated replies.

use medirag_types::chat::ResponseStyle;
use medirag_types::config::LlmConfig;
use medirag_types::llm::{CompletionRequest, Message};

use super::context::GenerationContext;
use super::templates::DISCLAIMER;

fn style_instruction(style: ResponseStyle) -> &'static str {
    match style {
        ResponseStyle::Urgent => {
            "The user may be facing an emergency. Start by telling them to call emergency \
             services or go to the nearest emergency room, then give brief, clear information."
        }
        ResponseStyle::Friendly => {
            "Answer in a warm, encouraging and conversational tone. Keep it easy to read."
        }
        ResponseStyle::Detailed => {
            "Give a thorough, well-structured answer with key points, risk factors and \
             suggested next steps."
        }
        ResponseStyle::Professional => {
            "Answer clearly and professionally. Summarise the relevant facts and finish \
             with practical recommendations."
        }
    }
}

/// System prompt: role, style, safety rules and retrieved context.
pub fn system_prompt(style: ResponseStyle, ctx: &GenerationContext, max_context_chars: usize) -> String {
    let mut prompt = format!(
        "You are a healthcare information assistant. {}\n\n\
         Never diagnose or prescribe. Base your answer on the context below when it is \
         relevant, and say so when it does not cover the question. End with this notice: \
         \"{DISCLAIMER}\"",
        style_instruction(style)
    );
    let context = ctx.prompt_context(max_context_chars);
    if !context.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(&context);
    }
    if let Some(user_id) = &ctx.user_id {
        prompt.push_str(&format!("\n\nYou are talking to {user_id}."));
    }
    prompt
}

pub fn build_request(
    style: ResponseStyle,
    ctx: &GenerationContext,
    config: &LlmConfig,
    max_context_chars: usize,
) -> CompletionRequest {
    CompletionRequest {
        model: config.model.clone(),
        messages: vec![Message::user(ctx.user_message.clone())],
        system: Some(system_prompt(style, ctx, max_context_chars)),
        max_tokens: config.max_tokens,
        temperature: Some(config.temperature),
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::MemorySummary;
    use super::*;

    fn ctx(knowledge: &str) -> GenerationContext {
        GenerationContext {
            user_message: "What is asthma?".to_string(),
            user_id: Some("bob".to_string()),
            knowledge_context: knowledge.to_string(),
            memory_context: String::new(),
            summary: MemorySummary::default(),
        }
    }

    #[test]
    fn test_system_prompt_carries_context_and_disclaimer() {
        let prompt = system_prompt(ResponseStyle::Urgent, &ctx("Source 1: Asthma"), 2000);
        assert!(prompt.contains("emergency services"));
        assert!(prompt.contains(DISCLAIMER));
        assert!(prompt.contains("Source 1: Asthma"));
        assert!(prompt.ends_with("You are talking to bob."));
    }

    #[test]
    fn test_context_is_bounded() {
        let long = "k".repeat(5000);
        let prompt = system_prompt(ResponseStyle::Professional, &ctx(&long), 100);
        assert!(!prompt.contains(&"k".repeat(101)));
    }

    #[test]
    fn test_build_request() {
        let config = LlmConfig::default();
        let request = build_request(ResponseStyle::Friendly, &ctx(""), &config, 2000);
        assert_eq!(request.model, config.model);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "What is asthma?");
        assert_eq!(request.temperature, Some(config.temperature));
    }
}
