//! Extractive summarization baseline.
//!
//! Takes leading sentences until the word budget is met. Stands in for an
//! abstractive model behind the same [`Summarizer`] trait.

use anyhow::Result;
use async_trait::async_trait;

use crate::engine::Summarizer;

#[derive(Debug, Clone, Default)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let end = i + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn summarize(&self, text: &str, max_words: usize, min_words: usize) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("Nothing to summarize: empty text");
        }

        let mut summary = String::new();
        let mut words = 0;

        for sentence in split_sentences(text) {
            let sentence_words = word_count(sentence);
            if words >= min_words && words + sentence_words > max_words {
                break;
            }
            if !summary.is_empty() {
                summary.push(' ');
            }
            summary.push_str(sentence);
            words += sentence_words;
            if words >= max_words {
                break;
            }
        }

        // A single oversized sentence still has to fit the budget.
        if word_count(&summary) > max_words {
            summary = summary
                .split_whitespace()
                .take(max_words)
                .collect::<Vec<_>>()
                .join(" ");
        }

        Ok(summary)
    }
}
