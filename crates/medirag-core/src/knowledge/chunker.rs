//! Category-aware document chunking.
//!
//! Clinical categories are chunked sentence-by-sentence inside paragraphs,
//! general-health categories paragraph-by-paragraph, and anything else in
//! fixed-size overlapping windows. Sizes are measured in chars.

use medirag_types::config::KnowledgeConfig;
use medirag_types::knowledge::{Category, ChunkType};

/// Window positions searched backwards for a sentence end.
const SENTENCE_LOOKBACK: usize = 100;

/// A chunk before ids and document metadata are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    pub content: String,
    pub chunk_type: ChunkType,
    pub sentence_count: Option<u32>,
    pub start_pos: Option<usize>,
    pub end_pos: Option<usize>,
}

impl ChunkDraft {
    fn sentences(content: String, chunk_type: ChunkType, count: u32) -> Self {
        Self {
            content,
            chunk_type,
            sentence_count: Some(count),
            start_pos: None,
            end_pos: None,
        }
    }
}

/// Which splitting strategy a category uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    Medical,
    Paragraph,
    FixedSize,
}

impl ChunkStrategy {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::MedicalCondition | Category::Treatment | Category::Symptom => {
                ChunkStrategy::Medical
            }
            Category::General | Category::Wellness | Category::Prevention => {
                ChunkStrategy::Paragraph
            }
            Category::Other => ChunkStrategy::FixedSize,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
    max_chunks: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize, max_chunks: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            max_chunks,
        }
    }

    pub fn from_config(config: &KnowledgeConfig) -> Self {
        Self::new(
            config.chunk_size,
            config.chunk_overlap,
            config.max_chunks_per_document,
        )
    }

    /// Split `content` with the strategy for `category`, keeping at most
    /// `max_chunks` chunks.
    pub fn chunk(&self, content: &str, category: Category) -> Vec<ChunkDraft> {
        let content = content.replace("\r\n", "\n");
        let mut drafts = match ChunkStrategy::for_category(category) {
            ChunkStrategy::Medical => self.chunk_medical(&content),
            ChunkStrategy::Paragraph => self.chunk_paragraphs(&content),
            ChunkStrategy::FixedSize => self.chunk_fixed_size(&content),
        };
        drafts.truncate(self.max_chunks);
        drafts
    }

    fn chunk_medical(&self, content: &str) -> Vec<ChunkDraft> {
        paragraphs(content)
            .flat_map(|p| {
                self.accumulate_sentences(p, ChunkType::MedicalParagraph, ChunkType::MedicalSentence)
            })
            .collect()
    }

    fn chunk_paragraphs(&self, content: &str) -> Vec<ChunkDraft> {
        let mut drafts = Vec::new();
        for (index, paragraph) in content.split("\n\n").enumerate() {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            if paragraph.chars().count() > self.chunk_size {
                drafts.extend(self.accumulate_sentences(
                    paragraph,
                    ChunkType::SplitParagraph,
                    ChunkType::LongSentence,
                ));
            } else {
                drafts.push(ChunkDraft {
                    content: paragraph.to_string(),
                    chunk_type: ChunkType::GeneralParagraph,
                    sentence_count: None,
                    start_pos: Some(index),
                    end_pos: None,
                });
            }
        }
        drafts
    }

    /// Greedily pack sentences into chunks of at most `chunk_size` chars.
    ///
    /// A sentence that does not fit into an empty chunk is emitted alone as
    /// `single_type`.
    fn accumulate_sentences(
        &self,
        paragraph: &str,
        group_type: ChunkType,
        single_type: ChunkType,
    ) -> Vec<ChunkDraft> {
        let mut drafts = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;
        let mut count = 0u32;

        for sentence in sentences(paragraph) {
            let sentence_len = sentence.chars().count();
            if current_len + sentence_len > self.chunk_size {
                if current.is_empty() {
                    drafts.push(ChunkDraft::sentences(sentence.to_string(), single_type, 1));
                } else {
                    drafts.push(ChunkDraft::sentences(
                        std::mem::take(&mut current),
                        group_type,
                        count,
                    ));
                    current.push_str(sentence);
                    current_len = sentence_len;
                    count = 1;
                }
            } else {
                if !current.is_empty() {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(sentence);
                current_len += sentence_len;
                count += 1;
            }
        }

        if !current.is_empty() {
            drafts.push(ChunkDraft::sentences(current, group_type, count));
        }
        drafts
    }

    fn chunk_fixed_size(&self, content: &str) -> Vec<ChunkDraft> {
        let chars: Vec<char> = content.chars().collect();
        let total = chars.len();
        let mut drafts = Vec::new();
        let mut start = 0usize;

        while start < total {
            let mut end = start + self.chunk_size;
            if end < total {
                let lower = start.max(end.saturating_sub(SENTENCE_LOOKBACK));
                if let Some(i) = (lower + 1..=end)
                    .rev()
                    .find(|&i| matches!(chars[i], '.' | '!' | '?'))
                {
                    end = i + 1;
                }
            }
            let end = end.min(total);

            let window: String = chars[start..end].iter().collect();
            let trimmed = window.trim();
            if !trimmed.is_empty() {
                drafts.push(ChunkDraft {
                    content: trimmed.to_string(),
                    chunk_type: ChunkType::FixedSize,
                    sentence_count: None,
                    start_pos: Some(start),
                    end_pos: Some(end),
                });
            }

            let next = end.saturating_sub(self.chunk_overlap);
            if end >= total || next >= total {
                break;
            }
            start = if next > start { next } else { end };
        }
        drafts
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::from_config(&KnowledgeConfig::default())
    }
}

fn paragraphs(content: &str) -> impl Iterator<Item = &str> {
    content.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}

/// Sentences split on runs of `.`, `!`, `?`; terminators are dropped.
fn sentences(paragraph: &str) -> impl Iterator<Item = &str> {
    paragraph
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence_of(len: usize, letter: char) -> String {
        std::iter::repeat_n(letter, len).collect()
    }

    #[test]
    fn test_strategy_by_category() {
        assert_eq!(ChunkStrategy::for_category(Category::Symptom), ChunkStrategy::Medical);
        assert_eq!(ChunkStrategy::for_category(Category::Wellness), ChunkStrategy::Paragraph);
        assert_eq!(ChunkStrategy::for_category(Category::Other), ChunkStrategy::FixedSize);
    }

    #[test]
    fn test_medical_small_paragraphs_stay_whole() {
        let chunker = Chunker::default();
        let content = "Flu spreads fast. Rest helps!\n\nDrink fluids. See a doctor if worse?";
        let drafts = chunker.chunk(content, Category::Treatment);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].content, "Flu spreads fast Rest helps");
        assert_eq!(drafts[0].chunk_type, ChunkType::MedicalParagraph);
        assert_eq!(drafts[0].sentence_count, Some(2));
        assert_eq!(drafts[1].content, "Drink fluids See a doctor if worse");
    }

    #[test]
    fn test_medical_packs_until_limit() {
        let chunker = Chunker::new(100, 10, 10);
        let a = sentence_of(60, 'a');
        let b = sentence_of(30, 'b');
        let c = sentence_of(30, 'c');
        let content = format!("{a}. {b}. {c}.");
        let drafts = chunker.chunk(&content, Category::MedicalCondition);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].content, format!("{a} {b}"));
        assert_eq!(drafts[0].sentence_count, Some(2));
        assert_eq!(drafts[1].content, c);
        assert_eq!(drafts[1].sentence_count, Some(1));
    }

    #[test]
    fn test_medical_oversized_first_sentence_emitted_alone() {
        let chunker = Chunker::new(50, 10, 10);
        let long = sentence_of(80, 'x');
        let drafts = chunker.chunk(&format!("{long}. short one."), Category::Symptom);
        assert_eq!(drafts[0].chunk_type, ChunkType::MedicalSentence);
        assert_eq!(drafts[0].content, long);
        assert_eq!(drafts[1].chunk_type, ChunkType::MedicalParagraph);
        assert_eq!(drafts[1].content, "short one");
    }

    #[test]
    fn test_general_paragraphs() {
        let chunker = Chunker::default();
        let content = "Sleep matters.\n\n\n\nWalk daily.";
        let drafts = chunker.chunk(content, Category::Wellness);
        assert_eq!(drafts.len(), 2);
        assert!(drafts.iter().all(|d| d.chunk_type == ChunkType::GeneralParagraph));
        assert_eq!(drafts[0].content, "Sleep matters.");
        assert_eq!(drafts[1].content, "Walk daily.");
    }

    #[test]
    fn test_general_long_paragraph_is_split() {
        let chunker = Chunker::new(100, 10, 10);
        let paragraph = format!(
            "{}. {}. {}.",
            sentence_of(70, 'a'),
            sentence_of(70, 'b'),
            sentence_of(150, 'c')
        );
        let drafts = chunker.chunk(&paragraph, Category::Prevention);
        let types: Vec<ChunkType> = drafts.iter().map(|d| d.chunk_type).collect();
        assert_eq!(types, vec![ChunkType::SplitParagraph; 3]);
        // The 150-char sentence replaces the flushed chunk and is emitted at the end.
        assert_eq!(drafts[2].content.len(), 150);
    }

    #[test]
    fn test_general_long_sentence_first() {
        let chunker = Chunker::new(100, 10, 10);
        let paragraph = format!("{}. tail.", sentence_of(150, 'z'));
        let drafts = chunker.chunk(&paragraph, Category::General);
        assert_eq!(drafts[0].chunk_type, ChunkType::LongSentence);
        assert_eq!(drafts[1].chunk_type, ChunkType::SplitParagraph);
    }

    #[test]
    fn test_fixed_size_breaks_after_punctuation_and_overlaps() {
        let chunker = Chunker::new(512, 50, 10);
        // Sentence end at char 449 (index of '.'), inside the final 100 chars.
        let first = sentence_of(449, 'a');
        let content = format!("{first}.{}", sentence_of(400, 'b'));
        let drafts = chunker.chunk(&content, Category::Other);

        assert_eq!(drafts[0].chunk_type, ChunkType::FixedSize);
        assert_eq!(drafts[0].start_pos, Some(0));
        assert_eq!(drafts[0].end_pos, Some(450));
        assert!(drafts[0].content.ends_with('.'));
        // Next window starts 50 chars before the previous end.
        assert_eq!(drafts[1].start_pos, Some(400));
        assert_eq!(drafts[1].end_pos, Some(content.len()));
    }

    #[test]
    fn test_fixed_size_without_punctuation_uses_full_window() {
        let chunker = Chunker::new(512, 50, 10);
        let content = sentence_of(1000, 'q');
        let drafts = chunker.chunk(&content, Category::Other);
        assert_eq!(drafts[0].end_pos, Some(512));
        assert_eq!(drafts[1].start_pos, Some(462));
        assert_eq!(drafts[1].end_pos, Some(974));
        assert_eq!(drafts[2].start_pos, Some(924));
        assert_eq!(drafts.len(), 3);
    }

    #[test]
    fn test_max_chunks_enforced() {
        let chunker = Chunker::default();
        let content = (0..30)
            .map(|i| format!("Paragraph number {i}."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let drafts = chunker.chunk(&content, Category::General);
        assert_eq!(drafts.len(), 10);
    }

    #[test]
    fn test_empty_content() {
        let chunker = Chunker::default();
        for category in Category::ALL {
            assert!(chunker.chunk("   \n\n  ", category).is_empty());
        }
    }
}
