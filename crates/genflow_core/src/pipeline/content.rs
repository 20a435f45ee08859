//! Stage payloads: what generation, detection and humanization hand back.

use crate::job::Platform;

/// Detection scores strictly above this percentage trigger automatic humanization.
pub const HUMANIZE_THRESHOLD: u8 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    pub content: String,
    pub content_id: Option<String>,
    pub metadata: ContentMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMetadata {
    pub tone: String,
    pub word_count: u32,
    pub platform: Platform,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetectionVerdict {
    /// Share of the text judged machine-written, clamped to 0..=100.
    pub ai_percentage: u8,
    pub highlighted_markup: Option<String>,
    pub top_phrases: Vec<FlaggedPhrase>,
    pub summary: String,
    pub metrics: DetectionMetrics,
}

impl DetectionVerdict {
    pub fn exceeds_threshold(&self) -> bool {
        self.ai_percentage > HUMANIZE_THRESHOLD
    }

    /// Phrases that land in a flagged bucket, strongest first.
    pub fn flagged(&self) -> Vec<(&FlaggedPhrase, ConfidenceBucket)> {
        let mut flagged: Vec<_> = self
            .top_phrases
            .iter()
            .map(|p| (p, p.bucket()))
            .filter(|(_, bucket)| *bucket != ConfidenceBucket::Unflagged)
            .collect();
        flagged.sort_by(|a, b| b.0.confidence_percent.cmp(&a.0.confidence_percent));
        flagged
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetectionMetrics {
    pub sentence_count: u32,
    pub flagged_sentence_count: u32,
    pub average_sentence_length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedPhrase {
    pub phrase: String,
    pub confidence_percent: u8,
    pub reason: String,
}

impl FlaggedPhrase {
    pub fn bucket(&self) -> ConfidenceBucket {
        ConfidenceBucket::from_percent(self.confidence_percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceBucket {
    Unflagged,
    Low,
    Medium,
    High,
}

impl ConfidenceBucket {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            90.. => ConfidenceBucket::High,
            75..=89 => ConfidenceBucket::Medium,
            60..=74 => ConfidenceBucket::Low,
            _ => ConfidenceBucket::Unflagged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanizedVariant {
    pub text: String,
    pub phrases_removed_count: u32,
}

/// Everything the humanize operation needs, assembled from earlier stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanizeRequest {
    pub text: String,
    pub detected_phrases: Vec<String>,
    pub pass_count: u8,
    pub language: String,
}

/// Feeds detection output into humanization input: the phrase text of every
/// reported phrase, in detection order, blanks and duplicates removed.
pub fn detected_phrases(verdict: &DetectionVerdict) -> Vec<String> {
    let mut phrases: Vec<String> = Vec::with_capacity(verdict.top_phrases.len());
    for phrase in &verdict.top_phrases {
        let text = phrase.phrase.trim();
        if text.is_empty() || phrases.iter().any(|p| p == text) {
            continue;
        }
        phrases.push(text.to_string());
    }
    phrases
}
