use genflow_core::pipeline::{DetectionVerdict, GeneratedContent, HumanizeRequest, HumanizedVariant};
use genflow_core::{GenerationJob, ProgressSnapshot, RemoteJobStatus, SubjectKey};

use crate::transport::Negotiator;
use crate::wire::{
    json_or_string, DetectPayload, DetectResponse, GeneratePayload, GenerateResponse,
    HumanizePayload, HumanizeResponse, PollVideoResponse, ProgressResponse,
    StartComputationPayload, StartComputationResponse, StartVideoPayload, StartVideoResponse,
    SubjectPayload,
};
use crate::{RemoteOp, TransportCause, TransportError};

/// The remote operations, typed.
#[async_trait::async_trait]
pub trait RemoteService: Send + Sync {
    async fn generate(&self, job: &GenerationJob) -> Result<GeneratedContent, TransportError>;

    async fn detect(&self, text: &str, language: &str) -> Result<DetectionVerdict, TransportError>;

    async fn humanize(&self, request: &HumanizeRequest) -> Result<HumanizedVariant, TransportError>;

    /// Returns the remote request id.
    async fn start_video_job(
        &self,
        subject: &SubjectKey,
        report: &str,
        language: &str,
    ) -> Result<String, TransportError>;

    async fn poll_video_job(&self, subject: &SubjectKey) -> Result<RemoteJobStatus, TransportError>;

    /// Resolves when the computation ends; `true` if the remote accepted it.
    async fn start_long_computation(
        &self,
        subject: &SubjectKey,
        params: &str,
    ) -> Result<bool, TransportError>;

    async fn poll_progress(&self, subject: &SubjectKey) -> Result<ProgressSnapshot, TransportError>;
}

pub struct NegotiatedService {
    negotiator: Negotiator,
}

impl NegotiatedService {
    pub fn new(negotiator: Negotiator) -> Self {
        Self { negotiator }
    }

    pub fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }
}

#[async_trait::async_trait]
impl RemoteService for NegotiatedService {
    async fn generate(&self, job: &GenerationJob) -> Result<GeneratedContent, TransportError> {
        let payload = GeneratePayload {
            topic: &job.topic,
            target_keywords: &job.target_keywords,
            platform: job.platform.wire_name(),
            influence_level: job.influence_level.wire_name(),
            brand_voice_id: job.brand_voice_id.as_deref(),
            image_ref: job.image_ref.as_deref(),
        };
        let response: GenerateResponse = self.negotiator.call(RemoteOp::Generate, &payload).await?;
        Ok(response.into_content(job.platform))
    }

    async fn detect(&self, text: &str, language: &str) -> Result<DetectionVerdict, TransportError> {
        let payload = DetectPayload { text, language };
        let response: DetectResponse = self.negotiator.call(RemoteOp::Detect, &payload).await?;
        Ok(response.into())
    }

    async fn humanize(&self, request: &HumanizeRequest) -> Result<HumanizedVariant, TransportError> {
        let payload = HumanizePayload {
            text: &request.text,
            detected_phrases: &request.detected_phrases,
            pass_count: request.pass_count,
            language: &request.language,
        };
        let response: HumanizeResponse = self.negotiator.call(RemoteOp::Humanize, &payload).await?;
        Ok(response.into())
    }

    async fn start_video_job(
        &self,
        subject: &SubjectKey,
        report: &str,
        language: &str,
    ) -> Result<String, TransportError> {
        let payload = StartVideoPayload {
            subject_key: subject.as_str(),
            report_payload: json_or_string(report),
            language,
        };
        let response: StartVideoResponse = self
            .negotiator
            .call(RemoteOp::StartVideoJob, &payload)
            .await?;
        Ok(response.request_id)
    }

    async fn poll_video_job(&self, subject: &SubjectKey) -> Result<RemoteJobStatus, TransportError> {
        let payload = SubjectPayload {
            subject_key: subject.as_str(),
        };
        let response: PollVideoResponse = self
            .negotiator
            .call(RemoteOp::PollVideoJob, &payload)
            .await?;
        response.into_status().map_err(|reason| {
            TransportError::new(RemoteOp::PollVideoJob, TransportCause::Malformed(reason))
        })
    }

    async fn start_long_computation(
        &self,
        subject: &SubjectKey,
        params: &str,
    ) -> Result<bool, TransportError> {
        let payload = StartComputationPayload {
            subject_key: subject.as_str(),
            params: json_or_string(params),
        };
        let response: StartComputationResponse = self
            .negotiator
            .call(RemoteOp::StartLongComputation, &payload)
            .await?;
        Ok(response.accepted)
    }

    async fn poll_progress(&self, subject: &SubjectKey) -> Result<ProgressSnapshot, TransportError> {
        let payload = SubjectPayload {
            subject_key: subject.as_str(),
        };
        let response: ProgressResponse = self
            .negotiator
            .call(RemoteOp::PollProgress, &payload)
            .await?;
        Ok(response.into())
    }
}
