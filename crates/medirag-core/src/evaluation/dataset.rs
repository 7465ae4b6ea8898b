//! Built-in evaluation queries and relevance ground truth.

use medirag_types::evaluation::{Difficulty, GroundTruth, TestQuery};
use medirag_types::knowledge::Category;

/// Keywords that mark a result relevant when no topic matches the query.
pub const DEFAULT_RELEVANT: &[&str] = &["management", "treatment", "symptoms", "prevention"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn test_queries() -> Vec<TestQuery> {
    let query = |query: &str, category, keywords: &[&str], difficulty| TestQuery {
        query: query.to_string(),
        expected_category: category,
        expected_keywords: strings(keywords),
        difficulty,
    };
    vec![
        query(
            "What are the symptoms of hypertension?",
            Category::MedicalCondition,
            &["hypertension", "blood pressure", "symptoms"],
            Difficulty::Easy,
        ),
        query(
            "How to manage diabetes?",
            Category::MedicalCondition,
            &["diabetes", "management", "blood sugar"],
            Difficulty::Medium,
        ),
        query(
            "Treatment for respiratory infections",
            Category::Treatment,
            &["respiratory", "infection", "treatment"],
            Difficulty::Medium,
        ),
        query(
            "Mental health wellness tips",
            Category::Wellness,
            &["mental health", "wellness", "tips"],
            Difficulty::Easy,
        ),
        query(
            "Preventive care nutrition guidelines",
            Category::Prevention,
            &["prevention", "nutrition", "guidelines"],
            Difficulty::Hard,
        ),
    ]
}

pub fn ground_truth() -> Vec<GroundTruth> {
    let truth = |topic: &str, relevant: &[&str], irrelevant: &[&str]| GroundTruth {
        topic: topic.to_string(),
        relevant: strings(relevant),
        irrelevant: strings(irrelevant),
    };
    vec![
        truth(
            "hypertension",
            &["hypertension management", "blood pressure", "cardiovascular"],
            &["diabetes", "respiratory", "mental health"],
        ),
        truth(
            "diabetes",
            &["diabetes prevention", "blood sugar", "metabolic"],
            &["hypertension", "respiratory", "mental health"],
        ),
        truth(
            "respiratory",
            &["respiratory infection", "treatment", "infection"],
            &["hypertension", "diabetes", "mental health"],
        ),
    ]
}

/// Lowercased relevant keywords for a query: those of the first topic
/// named in the query, else [`DEFAULT_RELEVANT`].
pub fn relevant_keywords(query: &str, truth: &[GroundTruth]) -> Vec<String> {
    let lower = query.to_lowercase();
    truth
        .iter()
        .find(|t| lower.contains(&t.topic))
        .map(|t| t.relevant.iter().map(|k| k.to_lowercase()).collect())
        .unwrap_or_else(|| strings(DEFAULT_RELEVANT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sets() {
        assert_eq!(test_queries().len(), 5);
        assert_eq!(ground_truth().len(), 3);
        assert_eq!(test_queries()[4].difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_relevant_keywords_by_topic() {
        let truth = ground_truth();
        assert_eq!(
            relevant_keywords("Managing Diabetes at home", &truth),
            vec!["diabetes prevention", "blood sugar", "metabolic"]
        );
        assert_eq!(
            relevant_keywords("Mental health wellness tips", &truth),
            strings(DEFAULT_RELEVANT)
        );
    }
}
