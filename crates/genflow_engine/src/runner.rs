use std::sync::{mpsc, Arc};

use futures_util::future::{BoxFuture, FutureExt};
use genflow_core::{Effect, JobId, Msg};
use genflow_logging::{genflow_debug, genflow_info, genflow_warn, scope_job};

use crate::service::RemoteService;
use crate::timer::PollTimer;
use crate::TransportError;

/// Log scope for subject work, which belongs to no generation job.
const NO_JOB: JobId = 0;

/// Where the runner reports results. Returns `false` once nobody listens.
pub trait MsgSink: Send + Sync + 'static {
    fn send(&self, msg: Msg) -> bool;
}

impl MsgSink for mpsc::Sender<Msg> {
    fn send(&self, msg: Msg) -> bool {
        mpsc::Sender::send(self, msg).is_ok()
    }
}

impl MsgSink for tokio::sync::mpsc::UnboundedSender<Msg> {
    fn send(&self, msg: Msg) -> bool {
        tokio::sync::mpsc::UnboundedSender::send(self, msg).is_ok()
    }
}

/// Executes core effects against a [`RemoteService`] and reports every
/// outcome back as a [`Msg`]. Owns the watcher and sampler timers.
///
/// Must be driven from within a tokio runtime.
pub struct EffectRunner {
    service: Arc<dyn RemoteService>,
    sink: Arc<dyn MsgSink>,
    watch_timer: PollTimer,
    sample_timer: PollTimer,
}

impl EffectRunner {
    pub fn new(service: Arc<dyn RemoteService>, sink: Arc<dyn MsgSink>) -> Self {
        Self {
            service,
            sink,
            watch_timer: PollTimer::new("watch"),
            sample_timer: PollTimer::new("sample"),
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watch_timer.is_running()
    }

    pub fn is_sampling(&self) -> bool {
        self.sample_timer.is_running()
    }

    /// Runs `effects` in order. Notices and the comparison prompt are
    /// presentation concerns and are handed back to the caller.
    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        effects
            .into_iter()
            .filter_map(|effect| self.execute(effect))
            .collect()
    }

    fn execute(&mut self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::Generate { job_id, job } => self.spawn(job_id, move |service| {
                async move {
                    let result = service.generate(&job).await.map_err(report);
                    Msg::GenerationFinished { job_id, result }
                }
                .boxed()
            }),
            Effect::Detect {
                job_id,
                text,
                language,
            } => self.spawn(job_id, move |service| {
                async move {
                    let result = service.detect(&text, &language).await.map_err(report);
                    Msg::DetectionFinished { job_id, result }
                }
                .boxed()
            }),
            Effect::ScheduleHumanize { job_id, delay } => self.spawn(job_id, move |_| {
                async move {
                    tokio::time::sleep(delay).await;
                    Msg::HumanizeDelayElapsed { job_id }
                }
                .boxed()
            }),
            Effect::Humanize { job_id, request } => self.spawn(job_id, move |service| {
                async move {
                    let result = service.humanize(&request).await.map_err(report);
                    Msg::HumanizationFinished { job_id, result }
                }
                .boxed()
            }),
            Effect::StartVideoJob {
                subject,
                epoch,
                report: payload,
                language,
            } => self.spawn(NO_JOB, move |service| {
                async move {
                    let result = service
                        .start_video_job(&subject, &payload, &language)
                        .await
                        .map_err(report);
                    Msg::VideoJobStarted {
                        subject,
                        epoch,
                        result,
                    }
                }
                .boxed()
            }),
            Effect::StopWatchTimer { epoch } => {
                self.watch_timer.stop_epoch(epoch);
            }
            Effect::StartWatchTimer {
                subject,
                epoch,
                interval,
            } => {
                genflow_info!("Watching video job for {} every {:?}", subject, interval);
                let sink = self.sink.clone();
                self.watch_timer
                    .start(epoch, interval, move || sink.send(Msg::WatchTick { epoch }));
            }
            Effect::PollVideoJob { subject, epoch } => self.spawn(NO_JOB, move |service| {
                async move {
                    let result = service.poll_video_job(&subject).await.map_err(report);
                    Msg::VideoStatusReceived {
                        subject,
                        epoch,
                        result,
                    }
                }
                .boxed()
            }),
            Effect::FetchLastKnown { subject, epoch } => self.spawn(NO_JOB, move |service| {
                async move {
                    let result = service.poll_video_job(&subject).await.map_err(report);
                    Msg::LastKnownReceived {
                        subject,
                        epoch,
                        result,
                    }
                }
                .boxed()
            }),
            Effect::StartLongComputation {
                subject,
                epoch,
                params,
            } => self.spawn(NO_JOB, move |service| {
                async move {
                    let result = service
                        .start_long_computation(&subject, &params)
                        .await
                        .map_err(report);
                    Msg::LongComputationFinished {
                        subject,
                        epoch,
                        result,
                    }
                }
                .boxed()
            }),
            Effect::StopSampling { epoch } => {
                self.sample_timer.stop_epoch(epoch);
            }
            Effect::StartSampling {
                subject,
                epoch,
                interval,
            } => {
                genflow_debug!("Sampling progress for {} every {:?}", subject, interval);
                let sink = self.sink.clone();
                self.sample_timer
                    .start(epoch, interval, move || sink.send(Msg::SampleTick { epoch }));
            }
            Effect::PollProgress { subject, epoch } => self.spawn(NO_JOB, move |service| {
                async move {
                    let result = service.poll_progress(&subject).await.map_err(report);
                    Msg::ProgressReceived {
                        subject,
                        epoch,
                        result,
                    }
                }
                .boxed()
            }),
            effect @ (Effect::Notify(_) | Effect::PresentReconciliation { .. }) => {
                return Some(effect);
            }
        }
        None
    }

    /// Spawns `task` with its log lines attributed to `job_id`.
    fn spawn<F>(&self, job_id: JobId, task: F)
    where
        F: FnOnce(Arc<dyn RemoteService>) -> BoxFuture<'static, Msg>,
    {
        let future = task(self.service.clone());
        let sink = self.sink.clone();
        tokio::spawn(scope_job(job_id, async move {
            let msg = future.await;
            if !sink.send(msg) {
                genflow_debug!("Message receiver closed; result dropped");
            }
        }));
    }
}

/// Effects the runner leaves to whoever renders the state.
pub fn is_presentation(effect: &Effect) -> bool {
    matches!(
        effect,
        Effect::Notify(_) | Effect::PresentReconciliation { .. }
    )
}

fn report(err: TransportError) -> String {
    genflow_warn!("{}", err);
    err.summary()
}
