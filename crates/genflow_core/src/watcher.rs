//! Polling watcher for remotely rendered video jobs.
//!
//! The watcher owns at most one timer. Every timer start bumps the epoch, and
//! ticks or poll responses carrying another epoch or another subject are
//! dropped without a trace in the UI.

use std::fmt;

use genflow_logging::{genflow_debug, genflow_info, genflow_warn};

use crate::effect::{Effect, Notice, RetryTarget};
use crate::settings::Settings;

/// Timer generation counter.
pub type Epoch = u64;

/// The entity a polling job is scoped to, e.g. a selected project or domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectKey(String);

impl SubjectKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Pending,
    Done,
    Failed,
}

/// Status as reported by the remote job backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteJobStatus {
    Pending,
    Done {
        url: String,
        generated_at: Option<String>,
    },
    Failed,
    /// The backend has no job for the subject any more.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollableJob {
    pub request_id: Option<String>,
    pub subject_key: SubjectKey,
    pub status: JobStatus,
    pub result_url: Option<String>,
    pub generated_at: Option<String>,
}

impl PollableJob {
    fn idle(subject_key: SubjectKey) -> Self {
        Self {
            request_id: None,
            subject_key,
            status: JobStatus::Idle,
            result_url: None,
            generated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoWatcher {
    job: Option<PollableJob>,
    attempts: u32,
    epoch: Epoch,
    timer_running: bool,
    /// A start request is in flight; a second one would duplicate work.
    launching: bool,
    last_report: Option<String>,
}

impl VideoWatcher {
    pub fn job(&self) -> Option<&PollableJob> {
        self.job.as_ref()
    }

    pub fn subject(&self) -> Option<&SubjectKey> {
        self.job.as_ref().map(|job| &job.subject_key)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_polling(&self) -> bool {
        self.timer_running
    }

    pub fn is_launching(&self) -> bool {
        self.launching
    }

    /// Adopts a new subject: the running timer stops before anything else
    /// happens, then the subject's last-known state is fetched once.
    pub(crate) fn select_subject(&mut self, subject: SubjectKey) -> Vec<Effect> {
        if self.subject() == Some(&subject) {
            return Vec::new();
        }
        let mut effects = self.stop_timer();
        self.epoch += 1;
        self.launching = false;
        self.attempts = 0;
        genflow_info!("Watching subject {}", subject);
        self.job = Some(PollableJob::idle(subject.clone()));
        effects.push(Effect::FetchLastKnown {
            subject,
            epoch: self.epoch,
        });
        effects
    }

    pub(crate) fn request_video(&mut self, report: String, settings: &Settings) -> Vec<Effect> {
        let Some(subject) = self.subject().cloned() else {
            return vec![Effect::Notify(Notice::warning(
                "Select a project before generating a video.",
            ))];
        };
        if self.launching {
            genflow_debug!("Video request for {} already in flight", subject);
            return Vec::new();
        }
        let mut effects = self.stop_timer();
        self.epoch += 1;
        self.launching = true;
        self.last_report = Some(report.clone());
        self.job = Some(PollableJob::idle(subject.clone()));
        effects.push(Effect::StartVideoJob {
            subject,
            epoch: self.epoch,
            report,
            language: settings.language.clone(),
        });
        effects
    }

    /// Result of the launch tagged `epoch`. Launches abandoned by a subject
    /// switch or unmount no longer match and are dropped.
    pub(crate) fn job_started(
        &mut self,
        subject: &SubjectKey,
        epoch: Epoch,
        result: Result<String, String>,
        settings: &Settings,
    ) -> Vec<Effect> {
        if self.subject() != Some(subject) || epoch != self.epoch || !self.launching {
            genflow_debug!("Dropping stale video start for {}", subject);
            return Vec::new();
        }
        self.launching = false;
        match result {
            Ok(request_id) => {
                let mut effects = self.stop_timer();
                self.epoch += 1;
                self.attempts = 0;
                self.timer_running = true;
                if let Some(job) = self.job.as_mut() {
                    job.request_id = Some(request_id.clone());
                    job.status = JobStatus::Pending;
                }
                genflow_info!("Video job {} pending for {}", request_id, subject);
                effects.push(Effect::StartWatchTimer {
                    subject: subject.clone(),
                    epoch: self.epoch,
                    interval: settings.watch_interval,
                });
                effects
            }
            Err(reason) => {
                genflow_warn!("Video job for {} could not start: {}", subject, reason);
                self.set_status(JobStatus::Failed);
                vec![Effect::Notify(Notice::error(
                    format!("Video generation could not start: {reason}"),
                    RetryTarget::VideoJob,
                ))]
            }
        }
    }

    /// Scheduled timer tick. Ticks past the attempt ceiling fail the job.
    pub(crate) fn tick(&mut self, epoch: Epoch, settings: &Settings) -> Vec<Effect> {
        if epoch != self.epoch || !self.timer_running || !self.is_pending() {
            genflow_debug!("Dropping stale watch tick (epoch {} vs {})", epoch, self.epoch);
            return Vec::new();
        }
        let Some(subject) = self.subject().cloned() else {
            return Vec::new();
        };
        self.attempts += 1;
        if self.attempts > settings.watch_max_attempts {
            genflow_warn!(
                "Video job for {} still pending after {} polls; giving up",
                subject,
                settings.watch_max_attempts
            );
            let mut effects = self.stop_timer();
            self.set_status(JobStatus::Failed);
            effects.push(Effect::Notify(Notice::error(
                "Video generation is taking too long. Try again.",
                RetryTarget::VideoJob,
            )));
            return effects;
        }
        vec![Effect::PollVideoJob {
            subject,
            epoch: self.epoch,
        }]
    }

    /// Extra immediate poll; leaves the counter and the timer alone.
    pub(crate) fn check_now(&mut self) -> Vec<Effect> {
        match self.job.as_ref() {
            Some(job) if job.status == JobStatus::Pending => vec![Effect::PollVideoJob {
                subject: job.subject_key.clone(),
                epoch: self.epoch,
            }],
            _ => Vec::new(),
        }
    }

    pub(crate) fn status_received(
        &mut self,
        subject: &SubjectKey,
        epoch: Epoch,
        result: Result<RemoteJobStatus, String>,
    ) -> Vec<Effect> {
        if self.subject() != Some(subject) || epoch != self.epoch || !self.is_pending() {
            genflow_debug!("Dropping stale video status for {} (epoch {})", subject, epoch);
            return Vec::new();
        }
        let status = match result {
            Ok(status) => status,
            Err(reason) => {
                // The attempt still counted; the ceiling bounds repeated failures.
                genflow_warn!("Video status poll for {} failed: {}", subject, reason);
                return Vec::new();
            }
        };
        match status {
            RemoteJobStatus::Pending => Vec::new(),
            RemoteJobStatus::Done { url, generated_at } => {
                let mut effects = self.stop_timer();
                if let Some(job) = self.job.as_mut() {
                    job.status = JobStatus::Done;
                    job.result_url = Some(url);
                    job.generated_at = generated_at;
                }
                genflow_info!("Video for {} is ready", subject);
                effects.push(Effect::Notify(Notice::info("Your video is ready.")));
                effects
            }
            RemoteJobStatus::Failed => {
                let mut effects = self.stop_timer();
                self.set_status(JobStatus::Failed);
                effects.push(Effect::Notify(Notice::error(
                    "Video generation failed.",
                    RetryTarget::VideoJob,
                )));
                effects
            }
            RemoteJobStatus::NotFound => {
                genflow_info!("Video job for {} no longer exists; resetting", subject);
                let effects = self.stop_timer();
                if let Some(job) = self.job.as_mut() {
                    *job = PollableJob::idle(job.subject_key.clone());
                }
                effects
            }
        }
    }

    /// Adopts the state fetched right after a subject switch. Never starts polling.
    pub(crate) fn last_known_received(
        &mut self,
        subject: &SubjectKey,
        epoch: Epoch,
        result: Result<RemoteJobStatus, String>,
    ) -> Vec<Effect> {
        if self.subject() != Some(subject) || epoch != self.epoch || self.launching {
            genflow_debug!("Dropping stale last-known status for {}", subject);
            return Vec::new();
        }
        let Some(job) = self.job.as_mut() else {
            return Vec::new();
        };
        if job.status != JobStatus::Idle {
            return Vec::new();
        }
        match result {
            Ok(RemoteJobStatus::Pending) => job.status = JobStatus::Pending,
            Ok(RemoteJobStatus::Done { url, generated_at }) => {
                job.status = JobStatus::Done;
                job.result_url = Some(url);
                job.generated_at = generated_at;
            }
            Ok(RemoteJobStatus::Failed) => job.status = JobStatus::Failed,
            Ok(RemoteJobStatus::NotFound) => {}
            Err(reason) => {
                genflow_warn!("Could not read last video state for {}: {}", subject, reason);
            }
        }
        Vec::new()
    }

    /// Starts a brand-new remote job from the last report after a failure.
    pub(crate) fn retry(&mut self, settings: &Settings) -> Vec<Effect> {
        let failed = self
            .job
            .as_ref()
            .is_some_and(|job| job.status == JobStatus::Failed);
        match (failed, self.last_report.clone()) {
            (true, Some(report)) => self.request_video(report, settings),
            _ => Vec::new(),
        }
    }

    /// View went away: stop observing. The remote job keeps running.
    pub(crate) fn unmount(&mut self) -> Vec<Effect> {
        let effects = self.stop_timer();
        self.epoch += 1;
        self.job = None;
        self.launching = false;
        self.attempts = 0;
        effects
    }

    fn is_pending(&self) -> bool {
        self.job
            .as_ref()
            .is_some_and(|job| job.status == JobStatus::Pending)
    }

    fn set_status(&mut self, status: JobStatus) {
        if let Some(job) = self.job.as_mut() {
            job.status = status;
        }
    }

    fn stop_timer(&mut self) -> Vec<Effect> {
        if !self.timer_running {
            return Vec::new();
        }
        self.timer_running = false;
        let stop = Effect::StopWatchTimer { epoch: self.epoch };
        self.epoch += 1;
        vec![stop]
    }
}
