use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail};
use genflow_core::pipeline::{PipelinePhase, ReconciliationChoice};
use genflow_core::{
    update, AppState, ComparisonView, Effect, GenerationJob, JobStatus, Msg, Notice, NoticeLevel,
    Settings, SubjectKey,
};
use genflow_engine::{EngineHandle, RemoteService};
use genflow_logging::{genflow_debug, set_active_job};

use crate::render::{notice_line, view_lines};

const PUMP_INTERVAL: Duration = Duration::from_millis(250);

/// Owns the state, feeds engine results back through `update`, and prints
/// what changed.
pub struct Session {
    state: AppState,
    engine: EngineHandle,
    rendered: Vec<String>,
    last_error: Option<Notice>,
    quiet: bool,
}

impl Session {
    pub fn new(settings: Settings, service: Arc<dyn RemoteService>) -> Self {
        Self {
            state: AppState::with_settings(settings),
            engine: EngineHandle::new(service),
            rendered: Vec::new(),
            last_error: None,
            quiet: false,
        }
    }

    #[cfg(test)]
    fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let (mut state, effects) = update(std::mem::take(&mut self.state), msg);
        set_active_job(state.sequencer().current().map_or(0, |p| p.job_id()));

        for effect in self.engine.run(effects) {
            match effect {
                Effect::Notify(notice) => {
                    self.print(notice_line(&notice));
                    if notice.level == NoticeLevel::Error {
                        self.last_error = Some(notice);
                    }
                }
                Effect::PresentReconciliation { job_id, .. } => {
                    genflow_debug!("Comparison ready for job {}", job_id);
                }
                _ => {}
            }
        }

        if state.consume_dirty() {
            let lines = view_lines(&state.view());
            for line in lines.iter().filter(|line| !self.rendered.contains(line)) {
                self.print(line.clone());
            }
            self.rendered = lines;
        }
        self.state = state;
    }

    /// Applies the next engine result, waiting up to `timeout` for one.
    pub fn pump(&mut self, timeout: Duration) {
        if let Some(msg) = self.engine.recv_timeout(timeout) {
            self.dispatch(msg);
        }
        while let Some(msg) = self.engine.try_recv() {
            self.dispatch(msg);
        }
    }

    /// Runs one job to completion. `choose` settles the comparison when the
    /// humanized variant is waiting.
    pub fn run_generation<F>(&mut self, job: GenerationJob, mut choose: F) -> anyhow::Result<String>
    where
        F: FnMut(&ComparisonView) -> ReconciliationChoice,
    {
        self.last_error = None;
        self.dispatch(Msg::GenerateSubmitted(job));
        loop {
            let view = self.state.view();
            match view.phase {
                PipelinePhase::Idle => {
                    let reason = view
                        .validation_error
                        .unwrap_or_else(|| "nothing to generate".to_string());
                    bail!(reason);
                }
                PipelinePhase::Ready => {
                    return view.output.ok_or_else(|| anyhow!("job finished without output"));
                }
                PipelinePhase::Failed(stage) => bail!(self.failure(format!("{stage} failed"))),
                PipelinePhase::AwaitingReconciliation => match &view.comparison {
                    Some(comparison) => {
                        let choice = choose(comparison);
                        self.dispatch(Msg::VariantKept(choice));
                    }
                    None => self.pump(PUMP_INTERVAL),
                },
                _ => self.pump(PUMP_INTERVAL),
            }
        }
    }

    /// Starts a video for `subject` and watches it. Returns the result url.
    pub fn run_video(&mut self, subject: SubjectKey, report: String) -> anyhow::Result<String> {
        self.last_error = None;
        self.dispatch(Msg::SubjectSelected(subject));
        self.dispatch(Msg::VideoRequested { report });
        loop {
            let Some(video) = self.state.view().video else {
                bail!("no subject selected");
            };
            match (video.status, video.launching) {
                (JobStatus::Done, _) => {
                    return video
                        .result_url
                        .ok_or_else(|| anyhow!("video finished without a url"));
                }
                (JobStatus::Failed, false) => bail!(self.failure("video generation failed".to_string())),
                (JobStatus::Idle, false) => bail!("the video job no longer exists"),
                _ => self.pump(PUMP_INTERVAL),
            }
        }
    }

    /// Runs a long computation for `subject`, showing sampled progress.
    pub fn run_score(&mut self, subject: SubjectKey, params: String) -> anyhow::Result<()> {
        self.last_error = None;
        self.dispatch(Msg::SubjectSelected(subject));
        self.dispatch(Msg::LongComputationRequested { params });
        while self.state.sampler().in_flight() {
            self.pump(PUMP_INTERVAL);
        }
        match self.last_error.take() {
            Some(notice) => bail!(notice.message),
            None => Ok(()),
        }
    }

    fn failure(&mut self, fallback: String) -> String {
        self.last_error
            .take()
            .map(|notice| notice.message)
            .unwrap_or(fallback)
    }

    fn print(&self, line: String) {
        if !self.quiet {
            println!("{line}");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Stop any timers before the engine thread is torn down.
        self.dispatch(Msg::ViewUnmounted);
    }
}
