use crate::pipeline::content::{DetectionVerdict, GeneratedContent, HumanizedVariant};
use crate::pipeline::gate::ReconciliationChoice;
use crate::pipeline::stage::{StageKind, StageResult};

/// Output the pipeline committed to once the user picked a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalOutput {
    pub kept: ReconciliationChoice,
    pub text: String,
}

/// Per-job holder of stage outputs. Only the sequencer writes here; everyone
/// else gets read access.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageResultStore {
    generation: StageResult<GeneratedContent>,
    detection: StageResult<DetectionVerdict>,
    humanization: StageResult<HumanizedVariant>,
    final_output: Option<FinalOutput>,
    original_discarded: bool,
    humanized_discarded: bool,
}

impl StageResultStore {
    pub fn generation(&self) -> &StageResult<GeneratedContent> {
        &self.generation
    }

    pub fn detection(&self) -> &StageResult<DetectionVerdict> {
        &self.detection
    }

    pub fn humanization(&self) -> &StageResult<HumanizedVariant> {
        &self.humanization
    }

    pub fn final_output(&self) -> Option<&FinalOutput> {
        self.final_output.as_ref()
    }

    /// Raw generated text, unless a reconciliation discarded it.
    pub fn original_text(&self) -> Option<&str> {
        if self.original_discarded {
            return None;
        }
        self.generation.succeeded().map(|c| c.content.as_str())
    }

    /// Humanized variant, unless a reconciliation discarded it.
    pub fn humanized(&self) -> Option<&HumanizedVariant> {
        if self.humanized_discarded {
            return None;
        }
        self.humanization.succeeded()
    }

    pub fn verdict(&self) -> Option<&DetectionVerdict> {
        self.detection.succeeded()
    }

    /// Text the job currently stands behind: the committed choice if any,
    /// else the original generation.
    pub fn effective_output(&self) -> Option<&str> {
        match &self.final_output {
            Some(output) => Some(output.text.as_str()),
            None => self.original_text(),
        }
    }

    pub fn running_stage(&self) -> Option<StageKind> {
        if self.generation.is_running() {
            Some(StageKind::Generation)
        } else if self.detection.is_running() {
            Some(StageKind::Detection)
        } else if self.humanization.is_running() {
            Some(StageKind::Humanization)
        } else {
            None
        }
    }

    pub(crate) fn set_generation(&mut self, result: StageResult<GeneratedContent>) {
        debug_assert!(self.running_stage().is_none() || self.generation.is_running());
        self.generation = result;
    }

    pub(crate) fn set_detection(&mut self, result: StageResult<DetectionVerdict>) {
        debug_assert!(self.running_stage().is_none() || self.detection.is_running());
        self.detection = result;
    }

    pub(crate) fn set_humanization(&mut self, result: StageResult<HumanizedVariant>) {
        debug_assert!(self.running_stage().is_none() || self.humanization.is_running());
        if matches!(result, StageResult::Succeeded(_)) {
            self.humanized_discarded = false;
        }
        self.humanization = result;
    }

    /// Commits the user's choice. Keeping the humanized text clears both raw
    /// variants; keeping the original drops only the humanized one.
    pub(crate) fn commit(&mut self, kept: ReconciliationChoice) -> Option<&FinalOutput> {
        let text = match kept {
            ReconciliationChoice::Original => self.original_text()?.to_string(),
            ReconciliationChoice::Humanized => self.humanized()?.text.clone(),
        };
        self.discard_humanized();
        if kept == ReconciliationChoice::Humanized {
            if let Some(content) = self.generation.succeeded_mut() {
                content.content.clear();
            }
            self.original_discarded = true;
        }
        self.final_output = Some(FinalOutput { kept, text });
        self.final_output.as_ref()
    }

    fn discard_humanized(&mut self) {
        if let Some(variant) = self.humanization.succeeded_mut() {
            variant.text.clear();
        }
        self.humanized_discarded = true;
    }
}
