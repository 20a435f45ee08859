use crate::pipeline::{ConfidenceBucket, GateState, PipelinePhase, ReconciliationChoice, StageStatus};
use crate::{AppState, JobId, JobStatus, ProgressSnapshot, SubjectKey};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub job_id: Option<JobId>,
    pub phase: PipelinePhase,
    pub generation: StageStatus,
    pub detection: StageStatus,
    pub humanization: StageStatus,
    pub ai_percentage: Option<u8>,
    pub flagged_phrases: Vec<FlaggedPhraseView>,
    pub comparison: Option<ComparisonView>,
    /// Text the job currently stands behind.
    pub output: Option<String>,
    pub kept: Option<ReconciliationChoice>,
    pub validation_error: Option<String>,
    pub video: Option<VideoView>,
    pub progress: Option<ProgressSnapshot>,
    pub computing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedPhraseView {
    pub phrase: String,
    pub confidence_percent: u8,
    pub bucket: ConfidenceBucket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonView {
    pub original: String,
    pub humanized: String,
    pub phrases_removed_count: u32,
    pub dismissed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoView {
    pub subject: SubjectKey,
    pub status: JobStatus,
    pub launching: bool,
    pub attempts: u32,
    pub max_attempts: u32,
    pub result_url: Option<String>,
    pub generated_at: Option<String>,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        let mut view = AppViewModel {
            phase: state.sequencer.phase(),
            validation_error: state.sequencer.last_rejection().map(ToString::to_string),
            progress: state.sampler.snapshot().cloned(),
            computing: state.sampler.in_flight(),
            ..AppViewModel::default()
        };

        if let Some(pipeline) = state.sequencer.current() {
            let store = pipeline.store();
            view.job_id = Some(pipeline.job_id());
            view.generation = store.generation().status();
            view.detection = store.detection().status();
            view.humanization = store.humanization().status();
            if let Some(verdict) = store.verdict() {
                view.ai_percentage = Some(verdict.ai_percentage);
                view.flagged_phrases = verdict
                    .flagged()
                    .into_iter()
                    .map(|(phrase, bucket)| FlaggedPhraseView {
                        phrase: phrase.phrase.clone(),
                        confidence_percent: phrase.confidence_percent,
                        bucket,
                    })
                    .collect();
            }
            let gate = pipeline.gate();
            view.comparison = gate.comparison().map(|comparison| ComparisonView {
                original: comparison.original.clone(),
                humanized: comparison.humanized.clone(),
                phrases_removed_count: store
                    .humanized()
                    .map_or(0, |variant| variant.phrases_removed_count),
                dismissed: gate.state() == GateState::Dismissed,
            });
            view.output = store.effective_output().map(ToOwned::to_owned);
            view.kept = store.final_output().map(|output| output.kept);
        }

        let watcher = &state.watcher;
        view.video = watcher.job().map(|job| VideoView {
            subject: job.subject_key.clone(),
            status: job.status,
            launching: watcher.is_launching(),
            attempts: watcher.attempts(),
            max_attempts: state.settings.watch_max_attempts,
            result_url: job.result_url.clone(),
            generated_at: job.generated_at.clone(),
        });

        view
    }
}
