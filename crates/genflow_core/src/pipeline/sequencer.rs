use genflow_logging::{genflow_debug, genflow_info, genflow_warn};

use crate::effect::{Effect, Notice, RetryTarget};
use crate::job::{GenerationJob, JobId, ValidationError};
use crate::pipeline::content::{
    detected_phrases, DetectionVerdict, GeneratedContent, HumanizeRequest, HumanizedVariant,
};
use crate::pipeline::gate::{ReconciliationChoice, ReconciliationGate};
use crate::pipeline::stage::{StageKind, StageResult};
use crate::pipeline::store::StageResultStore;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePhase {
    #[default]
    Idle,
    Generating,
    Detecting,
    /// Verdict is in and crossed the threshold; humanization is scheduled.
    HumanizeDecision,
    Humanizing,
    AwaitingReconciliation,
    Ready,
    Failed(StageKind),
}

/// One generation job and everything the pipeline knows about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    job_id: JobId,
    job: GenerationJob,
    phase: PipelinePhase,
    store: StageResultStore,
    gate: ReconciliationGate,
    /// Set the first time humanization is triggered automatically. Never cleared.
    /// Duplicate verdicts already fall to the phase check; this also covers a
    /// detection that runs again on the same text.
    auto_humanized: bool,
}

impl Pipeline {
    fn new(job_id: JobId, job: GenerationJob) -> Self {
        Self {
            job_id,
            job,
            phase: PipelinePhase::Idle,
            store: StageResultStore::default(),
            gate: ReconciliationGate::default(),
            auto_humanized: false,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn job(&self) -> &GenerationJob {
        &self.job
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    pub fn store(&self) -> &StageResultStore {
        &self.store
    }

    pub fn gate(&self) -> &ReconciliationGate {
        &self.gate
    }

    pub fn auto_humanized(&self) -> bool {
        self.auto_humanized
    }

    fn start_generation(&mut self) -> Vec<Effect> {
        self.store.set_generation(StageResult::Running);
        self.phase = PipelinePhase::Generating;
        genflow_info!(
            "Job {} generating '{}' for {}",
            self.job_id,
            self.job.topic,
            self.job.platform
        );
        vec![Effect::Generate {
            job_id: self.job_id,
            job: self.job.clone(),
        }]
    }

    fn start_detection(&mut self, settings: &Settings) -> Vec<Effect> {
        let Some(text) = self.store.original_text().map(str::to_owned) else {
            return Vec::new();
        };
        self.store.set_detection(StageResult::Running);
        self.phase = PipelinePhase::Detecting;
        genflow_info!("Job {} detecting ({} chars)", self.job_id, text.len());
        vec![Effect::Detect {
            job_id: self.job_id,
            text,
            language: settings.language.clone(),
        }]
    }

    fn start_humanization(&mut self, settings: &Settings) -> Vec<Effect> {
        if self.store.running_stage().is_some() {
            return Vec::new();
        }
        let (Some(text), Some(verdict)) = (self.store.original_text(), self.store.verdict()) else {
            return Vec::new();
        };
        let request = HumanizeRequest {
            text: text.to_string(),
            detected_phrases: detected_phrases(verdict),
            pass_count: settings.humanize_passes,
            language: settings.language.clone(),
        };
        self.store.set_humanization(StageResult::Running);
        self.phase = PipelinePhase::Humanizing;
        genflow_info!(
            "Job {} humanizing with {} flagged phrases",
            self.job_id,
            request.detected_phrases.len()
        );
        vec![Effect::Humanize {
            job_id: self.job_id,
            request,
        }]
    }

    fn fail(&mut self, stage: StageKind, reason: String) -> Vec<Effect> {
        genflow_warn!("Job {} {} failed: {}", self.job_id, stage, reason);
        let message = match stage {
            StageKind::Generation => {
                format!("Content generation failed: {reason}. Start the job again.")
            }
            StageKind::Detection => format!("AI detection failed: {reason}."),
            StageKind::Humanization => {
                format!("Humanizing failed: {reason}. The original text is still available.")
            }
        };
        match stage {
            StageKind::Generation => self.store.set_generation(StageResult::Failed(reason)),
            StageKind::Detection => self.store.set_detection(StageResult::Failed(reason)),
            StageKind::Humanization => self.store.set_humanization(StageResult::Failed(reason)),
        }
        self.phase = PipelinePhase::Failed(stage);
        vec![Effect::Notify(Notice::error(message, RetryTarget::Stage(stage)))]
    }

    fn present_gate(&mut self) -> Vec<Effect> {
        let (Some(original), Some(humanized)) = (self.store.original_text(), self.store.humanized())
        else {
            return Vec::new();
        };
        let comparison = self.gate.present(original, &humanized.text);
        vec![Effect::PresentReconciliation {
            job_id: self.job_id,
            original: comparison.original.clone(),
            humanized: comparison.humanized.clone(),
        }]
    }
}

/// Drives generate → detect → humanize → reconcile for the current job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequencer {
    last_job_id: JobId,
    current: Option<Pipeline>,
    last_rejection: Option<ValidationError>,
}

impl Sequencer {
    pub fn current(&self) -> Option<&Pipeline> {
        self.current.as_ref()
    }

    pub fn phase(&self) -> PipelinePhase {
        self.current
            .as_ref()
            .map_or(PipelinePhase::Idle, Pipeline::phase)
    }

    pub fn last_rejection(&self) -> Option<&ValidationError> {
        self.last_rejection.as_ref()
    }

    /// Validates and starts a new job, discarding the previous one.
    pub(crate) fn submit(&mut self, job: GenerationJob) -> Vec<Effect> {
        if let Err(err) = job.validate() {
            genflow_warn!("Generation rejected before start: {}", err);
            let notice = Notice::warning(err.to_string());
            self.last_rejection = Some(err);
            return vec![Effect::Notify(notice)];
        }
        self.last_rejection = None;
        self.last_job_id += 1;
        let pipeline = self
            .current
            .insert(Pipeline::new(self.last_job_id, job));
        pipeline.start_generation()
    }

    pub(crate) fn generation_finished(
        &mut self,
        job_id: JobId,
        result: Result<GeneratedContent, String>,
        settings: &Settings,
    ) -> Vec<Effect> {
        let Some(pipeline) = self.active(job_id, PipelinePhase::Generating) else {
            return Vec::new();
        };
        match result {
            Ok(content) if content.content.trim().is_empty() => pipeline.fail(
                StageKind::Generation,
                "the generator returned no text".to_string(),
            ),
            Ok(content) => {
                pipeline.store.set_generation(StageResult::Succeeded(content));
                pipeline.start_detection(settings)
            }
            Err(reason) => pipeline.fail(StageKind::Generation, reason),
        }
    }

    pub(crate) fn detection_finished(
        &mut self,
        job_id: JobId,
        result: Result<DetectionVerdict, String>,
        settings: &Settings,
    ) -> Vec<Effect> {
        let Some(pipeline) = self.active(job_id, PipelinePhase::Detecting) else {
            return Vec::new();
        };
        let verdict = match result {
            Ok(verdict) => verdict,
            Err(reason) => return pipeline.fail(StageKind::Detection, reason),
        };
        let should_humanize = verdict.exceeds_threshold()
            && pipeline.store.humanized().is_none()
            && !pipeline.store.humanization().is_running()
            && !pipeline.auto_humanized;
        genflow_info!(
            "Job {} detection scored {}% AI",
            job_id,
            verdict.ai_percentage
        );
        pipeline.store.set_detection(StageResult::Succeeded(verdict));

        if should_humanize {
            pipeline.auto_humanized = true;
            pipeline.phase = PipelinePhase::HumanizeDecision;
            vec![Effect::ScheduleHumanize {
                job_id,
                delay: settings.humanize_delay,
            }]
        } else {
            pipeline.phase = PipelinePhase::Ready;
            Vec::new()
        }
    }

    pub(crate) fn humanize_delay_elapsed(&mut self, job_id: JobId, settings: &Settings) -> Vec<Effect> {
        match self.active(job_id, PipelinePhase::HumanizeDecision) {
            Some(pipeline) => pipeline.start_humanization(settings),
            None => Vec::new(),
        }
    }

    pub(crate) fn humanization_finished(
        &mut self,
        job_id: JobId,
        result: Result<HumanizedVariant, String>,
    ) -> Vec<Effect> {
        let Some(pipeline) = self.active(job_id, PipelinePhase::Humanizing) else {
            return Vec::new();
        };
        match result {
            Ok(variant) => {
                genflow_info!(
                    "Job {} humanized, {} phrases removed",
                    job_id,
                    variant.phrases_removed_count
                );
                pipeline
                    .store
                    .set_humanization(StageResult::Succeeded(variant));
                pipeline.phase = PipelinePhase::AwaitingReconciliation;
                pipeline.present_gate()
            }
            Err(reason) => pipeline.fail(StageKind::Humanization, reason),
        }
    }

    /// Manual "make it human". Re-opens a pending comparison instead of
    /// humanizing twice; otherwise runs humanization on demand.
    pub(crate) fn make_it_human(&mut self, settings: &Settings) -> Vec<Effect> {
        let Some(pipeline) = self.current.as_mut() else {
            return vec![Effect::Notify(Notice::warning("Generate content first."))];
        };
        if pipeline.gate.reopen().is_some() {
            return pipeline.present_gate();
        }
        if pipeline.store.running_stage().is_some() {
            genflow_debug!("Make-it-human ignored: a stage is still running");
            return Vec::new();
        }
        if !pipeline.store.generation().is_succeeded() {
            return vec![Effect::Notify(Notice::warning("Generate content first."))];
        }
        if pipeline.store.original_text().is_none() {
            return vec![Effect::Notify(Notice::info(
                "This content has already been humanized.",
            ))];
        }
        if pipeline.store.verdict().is_none() {
            return vec![Effect::Notify(Notice::warning(
                "Run AI detection before humanizing.",
            ))];
        }
        pipeline.start_humanization(settings)
    }

    pub(crate) fn keep(&mut self, choice: ReconciliationChoice) -> Vec<Effect> {
        let Some(pipeline) = self.current.as_mut() else {
            return Vec::new();
        };
        if pipeline.phase != PipelinePhase::AwaitingReconciliation {
            genflow_debug!("Keep {} ignored in phase {:?}", choice, pipeline.phase);
            return Vec::new();
        }
        let Some(choice) = pipeline.gate.resolve(choice) else {
            return Vec::new();
        };
        if pipeline.store.commit(choice).is_none() {
            genflow_warn!("Job {} had no {} variant to keep", pipeline.job_id, choice);
            return Vec::new();
        }
        pipeline.phase = PipelinePhase::Ready;
        genflow_info!("Job {} kept the {} variant", pipeline.job_id, choice);
        let message = match choice {
            ReconciliationChoice::Original => "Original version kept.",
            ReconciliationChoice::Humanized => "Humanized version kept.",
        };
        vec![Effect::Notify(Notice::info(message))]
    }

    pub(crate) fn dismiss_gate(&mut self) -> Vec<Effect> {
        if let Some(pipeline) = self.current.as_mut() {
            pipeline.gate.dismiss();
        }
        Vec::new()
    }

    /// Re-runs the failed stage only. A failed generation restarts the whole job.
    pub(crate) fn retry(&mut self, stage: StageKind, settings: &Settings) -> Vec<Effect> {
        let Some(pipeline) = self.current.as_mut() else {
            return Vec::new();
        };
        if pipeline.phase != PipelinePhase::Failed(stage) {
            genflow_debug!("Retry of {} ignored in phase {:?}", stage, pipeline.phase);
            return Vec::new();
        }
        match stage {
            StageKind::Generation => {
                let job = pipeline.job.clone();
                self.submit(job)
            }
            StageKind::Detection => pipeline.start_detection(settings),
            StageKind::Humanization => pipeline.start_humanization(settings),
        }
    }

    /// Current pipeline if it is `job_id` and sits in `phase`; late or
    /// duplicate results fall through here and are dropped.
    fn active(&mut self, job_id: JobId, phase: PipelinePhase) -> Option<&mut Pipeline> {
        match self.current.as_mut() {
            Some(pipeline) if pipeline.job_id == job_id && pipeline.phase == phase => Some(pipeline),
            Some(pipeline) => {
                genflow_debug!(
                    "Dropping result for job {} (current job {} in {:?})",
                    job_id,
                    pipeline.job_id,
                    pipeline.phase
                );
                None
            }
            None => None,
        }
    }
}
