use genflow_logging::{genflow_debug, genflow_info, genflow_warn};

use crate::effect::{Effect, Notice, RetryTarget};
use crate::settings::Settings;
use crate::watcher::{Epoch, SubjectKey};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub processed: u64,
    pub total: u64,
    pub percentage_point: u8,
    pub message: String,
}

/// Samples server-side progress while a long computation request is open.
/// The in-flight flag belongs to that request, so there is no attempt ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSampler {
    subject: Option<SubjectKey>,
    in_flight: bool,
    epoch: Epoch,
    snapshot: Option<ProgressSnapshot>,
    last_params: Option<String>,
}

impl ProgressSampler {
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn snapshot(&self) -> Option<&ProgressSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub(crate) fn begin(
        &mut self,
        subject: SubjectKey,
        params: String,
        settings: &Settings,
    ) -> Vec<Effect> {
        if self.in_flight {
            genflow_debug!("Long computation already running for {:?}", self.subject);
            return Vec::new();
        }
        self.in_flight = true;
        self.epoch += 1;
        self.snapshot = None;
        self.subject = Some(subject.clone());
        self.last_params = Some(params.clone());
        genflow_info!("Long computation started for {}", subject);
        vec![
            Effect::StartLongComputation {
                subject: subject.clone(),
                epoch: self.epoch,
                params,
            },
            Effect::StartSampling {
                subject,
                epoch: self.epoch,
                interval: settings.sample_interval,
            },
        ]
    }

    pub(crate) fn tick(&mut self, epoch: Epoch) -> Vec<Effect> {
        match (&self.subject, self.in_flight && epoch == self.epoch) {
            (Some(subject), true) => vec![Effect::PollProgress {
                subject: subject.clone(),
                epoch,
            }],
            _ => Vec::new(),
        }
    }

    pub(crate) fn progress_received(
        &mut self,
        subject: &SubjectKey,
        epoch: Epoch,
        result: Result<ProgressSnapshot, String>,
    ) -> Vec<Effect> {
        if !self.in_flight || epoch != self.epoch || self.subject.as_ref() != Some(subject) {
            genflow_debug!("Dropping late progress sample for {}", subject);
            return Vec::new();
        }
        match result {
            Ok(snapshot) => self.snapshot = Some(snapshot),
            Err(reason) => genflow_warn!("Progress poll for {} failed: {}", subject, reason),
        }
        Vec::new()
    }

    /// The long request returned; sampling ends whatever the outcome.
    /// Completions of an abandoned request carry an old epoch and are dropped.
    pub(crate) fn finished(
        &mut self,
        subject: &SubjectKey,
        epoch: Epoch,
        result: Result<bool, String>,
    ) -> Vec<Effect> {
        if !self.in_flight || epoch != self.epoch || self.subject.as_ref() != Some(subject) {
            genflow_debug!("Dropping stale computation result for {}", subject);
            return Vec::new();
        }
        let mut effects = self.stop();
        let notice = match result {
            Ok(true) => Notice::info("Scoring finished."),
            Ok(false) => Notice::warning("The scoring request was not accepted."),
            Err(reason) => Notice::error(
                format!("Scoring failed: {reason}"),
                RetryTarget::LongComputation,
            ),
        };
        effects.push(Effect::Notify(notice));
        effects
    }

    pub(crate) fn retry(&mut self, settings: &Settings) -> Vec<Effect> {
        match (self.in_flight, self.subject.clone(), self.last_params.clone()) {
            (false, Some(subject), Some(params)) => self.begin(subject, params, settings),
            _ => Vec::new(),
        }
    }

    /// Stops sampling and discards the snapshot; samples still in flight are
    /// dropped when they land.
    pub(crate) fn stop(&mut self) -> Vec<Effect> {
        if !self.in_flight {
            return Vec::new();
        }
        self.in_flight = false;
        self.snapshot = None;
        let stop = Effect::StopSampling { epoch: self.epoch };
        self.epoch += 1;
        vec![stop]
    }

    /// Forgets the subject entirely (subject switch or unmount).
    pub(crate) fn detach(&mut self) -> Vec<Effect> {
        let effects = self.stop();
        self.subject = None;
        self.last_params = None;
        effects
    }
}
