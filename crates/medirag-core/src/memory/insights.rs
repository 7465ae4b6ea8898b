//! Pure derivations over stored memory: profile insights and session
//! summaries.

use std::collections::BTreeMap;

use chrono::Utc;

use medirag_types::memory::{
    ConversationStyle, ConversationSummary, Level, MemoryEntry, Optimism, PersonalityTraits,
    ProfileInsights, UserProfile,
};

const TOP_INTERESTS: usize = 5;
const TOP_TOPICS: usize = 5;

/// The `n` highest counts, ties broken by key order.
pub fn top_counts(counts: &BTreeMap<String, u32>, n: usize) -> Vec<(String, u32)> {
    let mut sorted: Vec<(String, u32)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted.truncate(n);
    sorted
}

/// Personality traits from the sentiment distribution; `None` before the
/// first message.
pub fn personality(profile: &UserProfile) -> Option<PersonalityTraits> {
    let dist = &profile.sentiment_distribution;
    let total = dist.total();
    if total == 0 {
        return None;
    }

    let positive_ratio = f64::from(dist.positive) / f64::from(total);
    let negative_ratio = f64::from(dist.negative) / f64::from(total);

    let optimism_level = if positive_ratio > 0.6 {
        Optimism::High
    } else if negative_ratio > 0.6 {
        Optimism::Low
    } else {
        Optimism::Balanced
    };

    let engagement_level = match total {
        t if t > 10 => Level::High,
        t if t > 5 => Level::Medium,
        _ => Level::Low,
    };

    let health_consciousness = match profile.health_interests.len() {
        n if n > 5 => Level::High,
        n if n > 2 => Level::Medium,
        _ => Level::Low,
    };

    Some(PersonalityTraits {
        optimism_level,
        engagement_level,
        health_consciousness,
    })
}

pub fn conversation_style(profile: &UserProfile) -> ConversationStyle {
    match profile.total_messages {
        n if n < 3 => ConversationStyle::Formal,
        n if n > 10 => ConversationStyle::Casual,
        _ => ConversationStyle::Mixed,
    }
}

pub fn profile_insights(profile: &UserProfile) -> ProfileInsights {
    ProfileInsights {
        personality: personality(profile),
        conversation_style: conversation_style(profile),
        top_interests: top_counts(&profile.health_interests, TOP_INTERESTS),
    }
}

/// Summarise a session from its entries in chronological order.
pub fn summarize(session_id: &str, entries: &[MemoryEntry]) -> ConversationSummary {
    let mut topics: BTreeMap<String, u32> = BTreeMap::new();
    for entry in entries {
        for keyword in &entry.keywords {
            *topics.entry(keyword.clone()).or_default() += 1;
        }
    }

    let average_sentiment = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.sentiment.score()).sum::<f64>() / entries.len() as f64
    };

    let duration_minutes = match (entries.first(), entries.last()) {
        (Some(first), Some(last)) if entries.len() >= 2 => {
            (last.timestamp - first.timestamp).num_minutes()
        }
        _ => 0,
    };

    ConversationSummary {
        session_id: session_id.to_string(),
        total_turns: entries.len(),
        main_topics: top_counts(&topics, TOP_TOPICS),
        average_sentiment,
        unique_keywords: topics.len(),
        duration_minutes,
        last_updated: Utc::now(),
    }
}
