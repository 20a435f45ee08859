use std::time::Duration;

use crate::pipeline::{HumanizeRequest, StageKind};
use crate::{Epoch, GenerationJob, JobId, SubjectKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Generate {
        job_id: JobId,
        job: GenerationJob,
    },
    Detect {
        job_id: JobId,
        text: String,
        language: String,
    },
    /// Wait, then report `Msg::HumanizeDelayElapsed` so the verdict renders first.
    ScheduleHumanize {
        job_id: JobId,
        delay: Duration,
    },
    Humanize {
        job_id: JobId,
        request: HumanizeRequest,
    },
    PresentReconciliation {
        job_id: JobId,
        original: String,
        humanized: String,
    },
    /// `epoch` identifies this launch; its result is dropped once another one begins.
    StartVideoJob {
        subject: SubjectKey,
        epoch: Epoch,
        report: String,
        language: String,
    },
    /// Stop the watcher timer. Always precedes any `StartWatchTimer` in the same batch.
    StopWatchTimer {
        epoch: Epoch,
    },
    StartWatchTimer {
        subject: SubjectKey,
        epoch: Epoch,
        interval: Duration,
    },
    PollVideoJob {
        subject: SubjectKey,
        epoch: Epoch,
    },
    /// One-off status read after a subject switch; never repeated.
    FetchLastKnown {
        subject: SubjectKey,
        epoch: Epoch,
    },
    StartLongComputation {
        subject: SubjectKey,
        epoch: Epoch,
        params: String,
    },
    StopSampling {
        epoch: Epoch,
    },
    StartSampling {
        subject: SubjectKey,
        epoch: Epoch,
        interval: Duration,
    },
    PollProgress {
        subject: SubjectKey,
        epoch: Epoch,
    },
    Notify(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// What a notice's retry button re-runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryTarget {
    Stage(StageKind),
    VideoJob,
    LongComputation,
}

/// User-facing message with an optional retry affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub retry: Option<RetryTarget>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            retry: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
            retry: None,
        }
    }

    pub fn error(message: impl Into<String>, retry: RetryTarget) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            retry: Some(retry),
        }
    }
}
