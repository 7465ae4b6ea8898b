//! Lightweight text analysis shared by the knowledge base and memory manager.
//!
//! Everything here works on `lowercase().split_whitespace()` tokens. There is
//! no stemming and no punctuation stripping, so `"pain."` and `"pain"` are
//! different words.

use std::collections::HashSet;

use medirag_types::memory::Sentiment;

/// Words ignored by keyword extraction and keyword similarity.
pub const STOP_WORDS: [&str; 14] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

const HEALTH_WORDS: [&str; 10] = [
    "health", "medical", "doctor", "symptom", "treatment", "medicine", "pain", "fever", "cough",
    "headache",
];

const POSITIVE_WORDS: [&str; 7] = [
    "good", "great", "excellent", "happy", "better", "improved", "helpful",
];

const NEGATIVE_WORDS: [&str; 8] = [
    "bad", "terrible", "pain", "hurt", "sick", "worried", "anxious", "depressed",
];

const MAX_KEYWORDS: usize = 10;

/// Lowercased whitespace tokens.
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// First ten non-stop-words longer than two chars, in message order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    words(text)
        .into_iter()
        .filter(|w| !is_stop_word(w) && w.chars().count() > 2)
        .take(MAX_KEYWORDS)
        .collect()
}

/// Health relevance of a message in `[0, 1]`.
///
/// Density of health words counts double; longer messages score higher.
pub fn health_relevance(text: &str) -> f64 {
    let words = words(text);
    if words.is_empty() {
        return 0.0;
    }
    let total = words.len() as f64;
    let hits = words
        .iter()
        .filter(|w| HEALTH_WORDS.contains(&w.as_str()))
        .count() as f64;
    ((hits / total) * 2.0 + total / 50.0).min(1.0)
}

pub fn analyze_sentiment(text: &str) -> Sentiment {
    let words = words(text);
    let positive = words
        .iter()
        .filter(|w| POSITIVE_WORDS.contains(&w.as_str()))
        .count();
    let negative = words
        .iter()
        .filter(|w| NEGATIVE_WORDS.contains(&w.as_str()))
        .count();

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Jaccard similarity of the two texts' word sets, stop words removed.
pub fn keyword_similarity(query: &str, content: &str) -> f64 {
    let query_words: HashSet<String> = words(query)
        .into_iter()
        .filter(|w| !is_stop_word(w))
        .collect();
    let content_words: HashSet<String> = words(content)
        .into_iter()
        .filter(|w| !is_stop_word(w))
        .collect();

    if query_words.is_empty() || content_words.is_empty() {
        return 0.0;
    }

    let intersection = query_words.intersection(&content_words).count() as f64;
    let union = query_words.union(&content_words).count() as f64;
    intersection / union
}

/// Char-boundary safe prefix of at most `max_chars` chars.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// True if any of `needles` occurs as a substring of the lowercased text.
pub fn contains_any(text: &str, needles: &[&str]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_filters_and_limits() {
        let keywords = extract_keywords("What is the best treatment for a bad cough at night");
        assert_eq!(
            keywords,
            vec!["what", "best", "treatment", "bad", "cough", "night"]
        );

        let long = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima";
        assert_eq!(extract_keywords(long).len(), 10);
    }

    #[test]
    fn test_health_relevance() {
        assert_eq!(health_relevance(""), 0.0);
        // 2 health words out of 4: 0.5 * 2 + 4/50
        let score = health_relevance("doctor says fever persists");
        assert!((score - 1.0).abs() < 1e-9);
        // 0 health words out of 5: 5/50
        let score = health_relevance("what time is it now");
        assert!((score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_sentiment() {
        assert_eq!(analyze_sentiment("I feel much better today"), Sentiment::Positive);
        assert_eq!(analyze_sentiment("I am worried about the pain"), Sentiment::Negative);
        assert_eq!(analyze_sentiment("good but bad"), Sentiment::Neutral);
        assert_eq!(analyze_sentiment("tell me about sleep"), Sentiment::Neutral);
    }

    #[test]
    fn test_keyword_similarity_jaccard() {
        // {blood, pressure} vs {high, blood, pressure}: 2 / 3
        let sim = keyword_similarity("the blood pressure", "high blood pressure");
        assert!((sim - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(keyword_similarity("the a an", "anything"), 0.0);
        assert_eq!(keyword_similarity("sleep", "exercise"), 0.0);
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("fièvre", 3), "fiè");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn test_contains_any_is_case_insensitive() {
        assert!(contains_any("This is URGENT", &["urgent"]));
        assert!(!contains_any("calm question", &["urgent", "severe"]));
    }
}
