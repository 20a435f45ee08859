use crate::pipeline::{
    DetectionVerdict, GeneratedContent, HumanizedVariant, ReconciliationChoice,
};
use crate::{Epoch, GenerationJob, JobId, ProgressSnapshot, RemoteJobStatus, RetryTarget, SubjectKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the generation form.
    GenerateSubmitted(GenerationJob),
    GenerationFinished {
        job_id: JobId,
        result: Result<GeneratedContent, String>,
    },
    DetectionFinished {
        job_id: JobId,
        result: Result<DetectionVerdict, String>,
    },
    /// The pause after a verdict elapsed.
    HumanizeDelayElapsed { job_id: JobId },
    HumanizationFinished {
        job_id: JobId,
        result: Result<HumanizedVariant, String>,
    },
    /// User clicked "Make it human".
    MakeItHumanClicked,
    /// User picked a variant in the comparison dialog.
    VariantKept(ReconciliationChoice),
    /// User closed the comparison dialog without choosing.
    GateDismissed,
    /// User clicked the retry affordance of a notice.
    RetryClicked(RetryTarget),
    /// User picked a project or domain.
    SubjectSelected(SubjectKey),
    /// User asked for a video of the current subject's report.
    VideoRequested { report: String },
    VideoJobStarted {
        subject: SubjectKey,
        epoch: Epoch,
        result: Result<String, String>,
    },
    WatchTick { epoch: Epoch },
    VideoStatusReceived {
        subject: SubjectKey,
        epoch: Epoch,
        result: Result<RemoteJobStatus, String>,
    },
    LastKnownReceived {
        subject: SubjectKey,
        epoch: Epoch,
        result: Result<RemoteJobStatus, String>,
    },
    /// User clicked "Check now".
    CheckNowClicked,
    /// User asked for a long server-side computation on the current subject.
    LongComputationRequested { params: String },
    LongComputationFinished {
        subject: SubjectKey,
        epoch: Epoch,
        result: Result<bool, String>,
    },
    SampleTick { epoch: Epoch },
    ProgressReceived {
        subject: SubjectKey,
        epoch: Epoch,
        result: Result<ProgressSnapshot, String>,
    },
    /// The view hosting the watchers went away.
    ViewUnmounted,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
