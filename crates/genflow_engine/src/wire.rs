//! JSON shapes exchanged with the remote operations, and their mapping onto
//! core types.

use genflow_core::pipeline::{
    ContentMetadata, DetectionMetrics, DetectionVerdict, FlaggedPhrase, GeneratedContent,
    HumanizedVariant,
};
use genflow_core::{Platform, ProgressSnapshot, RemoteJobStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePayload<'a> {
    pub topic: &'a str,
    pub target_keywords: &'a [String],
    pub platform: &'a str,
    pub influence_level: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_voice_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub content: String,
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<GenerateMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMetadata {
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub platform: Option<String>,
}

impl GenerateResponse {
    /// `requested` stands in when the remote omits or garbles the platform.
    pub fn into_content(self, requested: Platform) -> GeneratedContent {
        let metadata = self.metadata.unwrap_or_default();
        let word_count = metadata
            .word_count
            .unwrap_or_else(|| self.content.split_whitespace().count() as u32);
        let platform = metadata
            .platform
            .and_then(|name| name.parse().ok())
            .unwrap_or(requested);
        GeneratedContent {
            content_id: self.content_id,
            metadata: ContentMetadata {
                tone: metadata.tone.unwrap_or_default(),
                word_count,
                platform,
            },
            content: self.content,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectPayload<'a> {
    pub text: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub ai_percentage: f64,
    #[serde(default)]
    pub highlighted_markup: Option<String>,
    #[serde(default)]
    pub top_phrases: Vec<WirePhrase>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub metrics: WireMetrics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePhrase {
    pub phrase: String,
    #[serde(default, alias = "confidence")]
    pub confidence_percent: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMetrics {
    #[serde(default)]
    pub sentence_count: f64,
    #[serde(default)]
    pub flagged_sentence_count: f64,
    #[serde(default)]
    pub average_sentence_length: f64,
}

fn percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

fn count(value: f64) -> u32 {
    if value.is_nan() || value < 0.0 {
        return 0;
    }
    value.round().min(u32::MAX as f64) as u32
}

impl From<DetectResponse> for DetectionVerdict {
    fn from(response: DetectResponse) -> Self {
        DetectionVerdict {
            ai_percentage: percent(response.ai_percentage),
            highlighted_markup: response.highlighted_markup,
            top_phrases: response
                .top_phrases
                .into_iter()
                .map(|p| FlaggedPhrase {
                    phrase: p.phrase,
                    confidence_percent: percent(p.confidence_percent),
                    reason: p.reason,
                })
                .collect(),
            summary: response.summary,
            metrics: DetectionMetrics {
                sentence_count: count(response.metrics.sentence_count),
                flagged_sentence_count: count(response.metrics.flagged_sentence_count),
                average_sentence_length: count(response.metrics.average_sentence_length),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizePayload<'a> {
    pub text: &'a str,
    pub detected_phrases: &'a [String],
    pub pass_count: u8,
    pub language: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeResponse {
    pub human_version: String,
    #[serde(default)]
    pub phrases_removed_count: u32,
    #[serde(default)]
    pub lengths: Option<Lengths>,
}

#[derive(Debug, Deserialize)]
pub struct Lengths {
    pub original: u32,
    pub humanized: u32,
}

impl From<HumanizeResponse> for HumanizedVariant {
    fn from(response: HumanizeResponse) -> Self {
        HumanizedVariant {
            text: response.human_version,
            phrases_removed_count: response.phrases_removed_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartVideoPayload<'a> {
    pub subject_key: &'a str,
    pub report_payload: Value,
    pub language: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartVideoResponse {
    pub request_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPayload<'a> {
    pub subject_key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollVideoResponse {
    pub status: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

impl PollVideoResponse {
    pub fn into_status(self) -> Result<RemoteJobStatus, String> {
        match self.status.to_ascii_lowercase().as_str() {
            "pending" | "queued" | "processing" => Ok(RemoteJobStatus::Pending),
            "done" | "completed" => match self.url {
                Some(url) if !url.trim().is_empty() => Ok(RemoteJobStatus::Done {
                    url,
                    generated_at: self.generated_at,
                }),
                _ => Err("job reported done without a url".to_string()),
            },
            "failed" | "error" => Ok(RemoteJobStatus::Failed),
            "not_found" => Ok(RemoteJobStatus::NotFound),
            other => Err(format!("unknown job status `{other}`")),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartComputationPayload<'a> {
    pub subject_key: &'a str,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub struct StartComputationResponse {
    pub accepted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub processed: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub percentage_point: Option<f64>,
    #[serde(default)]
    pub message: String,
}

impl From<ProgressResponse> for ProgressSnapshot {
    fn from(response: ProgressResponse) -> Self {
        let percentage_point = match response.percentage_point {
            Some(value) => percent(value),
            None if response.total > 0 => {
                percent(response.processed as f64 * 100.0 / response.total as f64)
            }
            None => 0,
        };
        ProgressSnapshot {
            processed: response.processed,
            total: response.total,
            percentage_point,
            message: response.message,
        }
    }
}

/// Free-form payloads travel as JSON when they parse, as a string otherwise.
pub fn json_or_string(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn detection_clamps_and_rounds() {
        let response: DetectResponse = serde_json::from_value(json!({
            "aiPercentage": 104.2,
            "topPhrases": [{ "phrase": "delve into", "confidence": 91.6, "reason": "stock phrase" }],
            "summary": "Mostly generated",
            "metrics": { "sentenceCount": 12, "flaggedSentenceCount": 7, "averageSentenceLength": 18.4 }
        }))
        .unwrap();
        let verdict = DetectionVerdict::from(response);
        assert_eq!(verdict.ai_percentage, 100);
        assert_eq!(verdict.top_phrases[0].confidence_percent, 92);
        assert_eq!(verdict.metrics.average_sentence_length, 18);
    }

    #[test]
    fn generate_metadata_falls_back_to_request() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "content": "three little words"
        }))
        .unwrap();
        let content = response.into_content(Platform::Reddit);
        assert_eq!(content.metadata.word_count, 3);
        assert_eq!(content.metadata.platform, Platform::Reddit);
    }

    #[test]
    fn poll_status_mapping() {
        let done = PollVideoResponse {
            status: "done".to_string(),
            url: Some("https://cdn.example.com/v.mp4".to_string()),
            generated_at: None,
        };
        assert!(matches!(done.into_status(), Ok(RemoteJobStatus::Done { .. })));

        let done_without_url = PollVideoResponse {
            status: "done".to_string(),
            url: None,
            generated_at: None,
        };
        assert!(done_without_url.into_status().is_err());

        let missing = PollVideoResponse {
            status: "not_found".to_string(),
            url: None,
            generated_at: None,
        };
        assert_eq!(missing.into_status(), Ok(RemoteJobStatus::NotFound));
    }

    #[test]
    fn progress_percentage_derived_when_absent() {
        let response: ProgressResponse =
            serde_json::from_value(json!({ "processed": 3, "total": 12 })).unwrap();
        assert_eq!(ProgressSnapshot::from(response).percentage_point, 25);
    }

    #[test]
    fn free_form_payloads() {
        assert_eq!(json_or_string("{\"a\":1}"), json!({ "a": 1 }));
        assert_eq!(json_or_string("plain"), json!("plain"));
    }
}
