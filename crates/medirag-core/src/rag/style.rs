//! Response style selection.

use medirag_types::chat::ResponseStyle;
use medirag_types::memory::{ConversationStyle, Optimism, UserProfileView};

use crate::text::contains_any;

pub const URGENT_TERMS: &[&str] = &["emergency", "urgent", "severe"];
pub const DETAILED_TERMS: &[&str] = &["technical", "detailed", "explain"];

/// Pick the reply style from the user's profile and the message wording.
///
/// Anonymous users always get the professional style. For known users a
/// casual or optimistic history wins over the wording of the message.
pub fn determine_response_style(
    profile: Option<&UserProfileView>,
    message: &str,
) -> ResponseStyle {
    let Some(view) = profile else {
        return ResponseStyle::Professional;
    };

    let optimistic = view
        .insights
        .personality
        .as_ref()
        .is_some_and(|p| p.optimism_level == Optimism::High);

    if view.insights.conversation_style == ConversationStyle::Casual || optimistic {
        ResponseStyle::Friendly
    } else if contains_any(message, URGENT_TERMS) {
        ResponseStyle::Urgent
    } else if contains_any(message, DETAILED_TERMS) {
        ResponseStyle::Detailed
    } else {
        ResponseStyle::Professional
    }
}

#[cfg(test)]
mod tests {
    use medirag_types::memory::UserProfile;

    use crate::memory::insights::profile_insights;

    use super::*;

    fn view(total_messages: u32, positive: u32, negative: u32) -> UserProfileView {
        let mut profile = UserProfile::new("u");
        profile.total_messages = total_messages;
        profile.sentiment_distribution.positive = positive;
        profile.sentiment_distribution.negative = negative;
        UserProfileView {
            insights: profile_insights(&profile),
            profile,
            stored: true,
        }
    }

    #[test]
    fn test_anonymous_is_professional() {
        assert_eq!(
            determine_response_style(None, "This is an emergency"),
            ResponseStyle::Professional
        );
    }

    #[test]
    fn test_casual_user_is_friendly() {
        let casual = view(12, 0, 12);
        assert_eq!(
            determine_response_style(Some(&casual), "severe pain"),
            ResponseStyle::Friendly
        );
    }

    #[test]
    fn test_optimistic_user_is_friendly() {
        let optimistic = view(4, 4, 0);
        assert_eq!(
            determine_response_style(Some(&optimistic), "explain it"),
            ResponseStyle::Friendly
        );
    }

    #[test]
    fn test_wording_for_known_user() {
        let plain = view(4, 1, 1);
        assert_eq!(
            determine_response_style(Some(&plain), "Severe chest pain"),
            ResponseStyle::Urgent
        );
        assert_eq!(
            determine_response_style(Some(&plain), "Can you explain insulin?"),
            ResponseStyle::Detailed
        );
        assert_eq!(
            determine_response_style(Some(&plain), "What is asthma?"),
            ResponseStyle::Professional
        );
    }
}
