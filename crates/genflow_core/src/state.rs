use crate::pipeline::Sequencer;
use crate::view_model::AppViewModel;
use crate::{ProgressSampler, Settings, SubjectKey, VideoWatcher};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) settings: Settings,
    pub(crate) sequencer: Sequencer,
    pub(crate) watcher: VideoWatcher,
    pub(crate) sampler: ProgressSampler,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn watcher(&self) -> &VideoWatcher {
        &self.watcher
    }

    pub fn sampler(&self) -> &ProgressSampler {
        &self.sampler
    }

    pub fn subject(&self) -> Option<&SubjectKey> {
        self.watcher.subject()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
