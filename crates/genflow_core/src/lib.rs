//! Genflow core: pure state machines for the generation pipeline and the
//! remote-job watchers, plus view-model helpers.
mod effect;
mod job;
mod msg;
pub mod pipeline;
mod sampler;
mod settings;
mod state;
mod update;
mod view_model;
mod watcher;

pub use effect::{Effect, Notice, NoticeLevel, RetryTarget};
pub use job::{GenerationJob, InfluenceLevel, JobId, Platform, ValidationError};
pub use msg::Msg;
pub use sampler::{ProgressSampler, ProgressSnapshot};
pub use settings::{
    Settings, DEFAULT_HUMANIZE_DELAY, DEFAULT_SAMPLE_INTERVAL, DEFAULT_WATCH_INTERVAL,
    DEFAULT_WATCH_MAX_ATTEMPTS,
};
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, ComparisonView, FlaggedPhraseView, VideoView};
pub use watcher::{Epoch, JobStatus, PollableJob, RemoteJobStatus, SubjectKey, VideoWatcher};
