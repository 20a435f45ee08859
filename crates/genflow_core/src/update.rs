use crate::{AppState, Effect, Msg, Notice, RetryTarget};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if matches!(msg, Msg::Tick | Msg::NoOp) {
        return (state, Vec::new());
    }
    let settings = state.settings.clone();

    let effects = match msg {
        Msg::GenerateSubmitted(job) => state.sequencer.submit(job),
        Msg::GenerationFinished { job_id, result } => {
            state
                .sequencer
                .generation_finished(job_id, result, &settings)
        }
        Msg::DetectionFinished { job_id, result } => {
            state.sequencer.detection_finished(job_id, result, &settings)
        }
        Msg::HumanizeDelayElapsed { job_id } => {
            state.sequencer.humanize_delay_elapsed(job_id, &settings)
        }
        Msg::HumanizationFinished { job_id, result } => {
            state.sequencer.humanization_finished(job_id, result)
        }
        Msg::MakeItHumanClicked => state.sequencer.make_it_human(&settings),
        Msg::VariantKept(choice) => state.sequencer.keep(choice),
        Msg::GateDismissed => state.sequencer.dismiss_gate(),
        Msg::RetryClicked(RetryTarget::Stage(stage)) => state.sequencer.retry(stage, &settings),
        Msg::RetryClicked(RetryTarget::VideoJob) => state.watcher.retry(&settings),
        Msg::RetryClicked(RetryTarget::LongComputation) => state.sampler.retry(&settings),
        Msg::SubjectSelected(subject) => {
            if state.watcher.subject() == Some(&subject) {
                Vec::new()
            } else {
                // Both timers stop before the new subject is adopted.
                let mut effects = state.sampler.detach();
                effects.extend(state.watcher.select_subject(subject));
                effects
            }
        }
        Msg::VideoRequested { report } => state.watcher.request_video(report, &settings),
        Msg::VideoJobStarted {
            subject,
            epoch,
            result,
        } => state.watcher.job_started(&subject, epoch, result, &settings),
        Msg::WatchTick { epoch } => state.watcher.tick(epoch, &settings),
        Msg::VideoStatusReceived {
            subject,
            epoch,
            result,
        } => state.watcher.status_received(&subject, epoch, result),
        Msg::LastKnownReceived {
            subject,
            epoch,
            result,
        } => state.watcher.last_known_received(&subject, epoch, result),
        Msg::CheckNowClicked => state.watcher.check_now(),
        Msg::LongComputationRequested { params } => match state.watcher.subject().cloned() {
            Some(subject) => state.sampler.begin(subject, params, &settings),
            None => vec![Effect::Notify(Notice::warning(
                "Select a project before starting a scoring run.",
            ))],
        },
        Msg::LongComputationFinished {
            subject,
            epoch,
            result,
        } => state.sampler.finished(&subject, epoch, result),
        Msg::SampleTick { epoch } => state.sampler.tick(epoch),
        Msg::ProgressReceived {
            subject,
            epoch,
            result,
        } => state.sampler.progress_received(&subject, epoch, result),
        Msg::ViewUnmounted => {
            let mut effects = state.sampler.detach();
            effects.extend(state.watcher.unmount());
            effects
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    state.mark_dirty();
    (state, effects)
}
