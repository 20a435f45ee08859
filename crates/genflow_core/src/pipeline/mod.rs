//! Generate → detect → humanize → reconcile.
mod content;
mod gate;
mod sequencer;
mod stage;
mod store;

pub use content::{
    detected_phrases, ConfidenceBucket, ContentMetadata, DetectionMetrics, DetectionVerdict,
    FlaggedPhrase, GeneratedContent, HumanizeRequest, HumanizedVariant, HUMANIZE_THRESHOLD,
};
pub use gate::{Comparison, GateState, ReconciliationChoice, ReconciliationGate};
pub use sequencer::{Pipeline, PipelinePhase, Sequencer};
pub use stage::{StageKind, StageResult, StageStatus};
pub use store::{FinalOutput, StageResultStore};
