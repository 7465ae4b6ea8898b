//! Template replies used when no language model is configured or the model
//! call fails.

use medirag_types::chat::ResponseStyle;

use super::context::GenerationContext;
use super::topics::detect_topic;

pub const DISCLAIMER: &str = "This information is for educational purposes only and is not a \
substitute for professional medical advice. Please consult a qualified healthcare provider \
about your situation.";

const EMERGENCY_NOTICE: &str = "This assistant offers general health information only and \
cannot give emergency medical guidance.";

/// Render the template for `style`, followed by a quick guide when the
/// message names a health topic.
pub fn render(style: ResponseStyle, ctx: &GenerationContext) -> String {
    let mut reply = match style {
        ResponseStyle::Urgent => urgent(ctx),
        ResponseStyle::Friendly => friendly(ctx),
        ResponseStyle::Detailed => detailed(ctx),
        ResponseStyle::Professional => professional(ctx),
    };
    if let Some(topic) = detect_topic(&ctx.user_message) {
        reply.push_str("\n\n");
        reply.push_str(&topic.quick_guide());
    }
    reply
}

fn urgent(ctx: &GenerationContext) -> String {
    let mut parts = vec![
        "**IMPORTANT: If you are experiencing a medical emergency:**".to_string(),
        "- Call emergency services (911) right away\n\
         - Go to the nearest emergency room\n\
         - Do not wait for online advice"
            .to_string(),
    ];
    if !ctx.knowledge_context.is_empty() {
        parts.push(format!("**Related information:**\n{}", ctx.knowledge_context));
    }
    parts.push(EMERGENCY_NOTICE.to_string());
    parts.push(DISCLAIMER.to_string());
    parts.join("\n\n")
}

fn friendly(ctx: &GenerationContext) -> String {
    let mut parts = vec!["Hi there!".to_string()];
    if let Some(user_id) = &ctx.user_id {
        parts.push(format!("Thanks for reaching out, {user_id}!"));
    }
    if ctx.knowledge_context.is_empty() {
        parts.push(
            "I don't have specific material on that yet, but I'm happy to share general \
             health information."
                .to_string(),
        );
        parts.push(
            "A balanced diet, regular movement and good sleep help with almost everything."
                .to_string(),
        );
    } else {
        parts.push(format!("Here's what I found for you:\n\n{}", ctx.knowledge_context));
    }
    parts.push(DISCLAIMER.to_string());
    parts.join("\n\n")
}

fn detailed(ctx: &GenerationContext) -> String {
    let mut parts = vec!["Here's a detailed look at your health question:".to_string()];
    if ctx.knowledge_context.is_empty() {
        parts.push(
            "**General considerations:**\n\
             - Symptoms and their duration\n\
             - Your medical history and current medications\n\
             - Lifestyle factors such as sleep, diet and activity"
                .to_string(),
        );
    } else {
        parts.push(format!("**Detailed information:**\n{}", ctx.knowledge_context));
        parts.push(
            "**Key points:**\n\
             - Follow evidence-based recommendations\n\
             - Clinical guidelines describe current best practice\n\
             - Know the risk factors and how to reduce them"
                .to_string(),
        );
    }
    parts.push(
        "**Next steps:** write down your questions and discuss them with your healthcare \
         provider."
            .to_string(),
    );
    parts.push(DISCLAIMER.to_string());
    parts.join("\n\n")
}

fn professional(ctx: &GenerationContext) -> String {
    let mut parts =
        vec!["Thank you for your health question. Here is what I can share:".to_string()];
    if !ctx.knowledge_context.is_empty() {
        parts.push(format!("**Relevant information:**\n{}", ctx.knowledge_context));
    }
    if !ctx.memory_context.is_empty() {
        parts.push(format!("**From our conversation:**\n{}", ctx.memory_context));
    }
    parts.push(
        "**Recommendations:**\n\
         - Monitor your symptoms and note any changes\n\
         - Keep up a healthy lifestyle\n\
         - Consult a healthcare professional for personal advice"
            .to_string(),
    );
    parts.push(format!("**Important:** {DISCLAIMER}"));
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::super::context::MemorySummary;
    use super::*;

    fn ctx(message: &str, user_id: Option<&str>, knowledge: &str, memory: &str) -> GenerationContext {
        GenerationContext {
            user_message: message.to_string(),
            user_id: user_id.map(str::to_string),
            knowledge_context: knowledge.to_string(),
            memory_context: memory.to_string(),
            summary: MemorySummary::default(),
        }
    }

    #[test]
    fn test_every_style_carries_disclaimer() {
        let c = ctx("question", None, "", "");
        for style in [
            ResponseStyle::Urgent,
            ResponseStyle::Friendly,
            ResponseStyle::Detailed,
            ResponseStyle::Professional,
        ] {
            assert!(render(style, &c).contains(DISCLAIMER), "{style}");
        }
    }

    #[test]
    fn test_urgent_puts_emergency_first() {
        let reply = render(ResponseStyle::Urgent, &ctx("severe pain", None, "Source 1: X", ""));
        assert!(reply.starts_with("**IMPORTANT"));
        assert!(reply.contains("911"));
        assert!(reply.contains("Source 1: X"));
    }

    #[test]
    fn test_friendly_greets_user() {
        let reply = render(ResponseStyle::Friendly, &ctx("q", Some("alice"), "", ""));
        assert!(reply.contains("Thanks for reaching out, alice!"));
        assert!(reply.contains("general health information"));
    }

    #[test]
    fn test_detailed_key_points_need_knowledge() {
        let with = render(ResponseStyle::Detailed, &ctx("q", None, "Source 1: X", ""));
        assert!(with.contains("**Key points:**"));
        let without = render(ResponseStyle::Detailed, &ctx("q", None, "", ""));
        assert!(without.contains("**General considerations:**"));
        assert!(!without.contains("**Key points:**"));
    }

    #[test]
    fn test_professional_includes_memory() {
        let reply = render(
            ResponseStyle::Professional,
            &ctx("q", None, "Source 1: X", "Previous: earlier..."),
        );
        assert!(reply.contains("**From our conversation:**\nPrevious: earlier..."));
        assert!(reply.contains("**Recommendations:**"));
    }

    #[test]
    fn test_quick_guide_appended_for_topic() {
        let reply = render(ResponseStyle::Professional, &ctx("I have a migraine", None, "", ""));
        assert!(reply.ends_with("- A sudden, severe headache needs urgent care\n"));
        let plain = render(ResponseStyle::Professional, &ctx("what now", None, "", ""));
        assert!(!plain.contains("Quick guide"));
    }
}
