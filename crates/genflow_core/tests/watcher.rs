use std::sync::Once;

use genflow_core::{
    update, AppState, Effect, Epoch, JobStatus, Msg, NoticeLevel, RemoteJobStatus, RetryTarget,
    SubjectKey,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(genflow_logging::initialize_for_tests);
}

fn subject(key: &str) -> SubjectKey {
    SubjectKey::new(key)
}

fn select(state: AppState, key: &str) -> (AppState, Vec<Effect>) {
    update(state, Msg::SubjectSelected(subject(key)))
}

/// Requests a video for the current subject. Returns the launch epoch.
fn request(state: AppState, report: &str) -> (AppState, Epoch) {
    let (state, effects) = update(
        state,
        Msg::VideoRequested {
            report: report.to_string(),
        },
    );
    let epoch = match effects.as_slice() {
        [Effect::StartVideoJob { epoch, .. }] => *epoch,
        other => panic!("unexpected effects {other:?}"),
    };
    (state, epoch)
}

fn started(state: AppState, key: &str, epoch: Epoch, request_id: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::VideoJobStarted {
            subject: subject(key),
            epoch,
            result: Ok(request_id.to_string()),
        },
    )
}

/// Selects `key`, requests a video and acknowledges the start. Returns the timer epoch.
fn pending_for(key: &str) -> (AppState, Epoch) {
    let (state, _) = select(AppState::new(), key);
    let (state, launch) = request(state, "{\"score\":71}");
    let (state, effects) = started(state, key, launch, "req-1");
    let epoch = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartWatchTimer { epoch, .. } => Some(*epoch),
            _ => None,
        })
        .expect("timer started");
    (state, epoch)
}

fn polls_for<'a>(effects: &'a [Effect], key: &str) -> Vec<&'a Effect> {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::PollVideoJob { subject, .. } if subject.as_str() == key))
        .collect()
}

#[test]
fn selecting_a_subject_fetches_last_known_once() {
    init_logging();
    let (state, effects) = select(AppState::new(), "project-a");
    assert!(matches!(
        effects.as_slice(),
        [Effect::FetchLastKnown { subject, .. }] if subject.as_str() == "project-a"
    ));
    assert_eq!(state.view().video.unwrap().status, JobStatus::Idle);

    // Selecting the same subject again does nothing.
    let (_state, effects) = select(state, "project-a");
    assert!(effects.is_empty());
}

#[test]
fn start_enters_pending_with_timer() {
    init_logging();
    let (state, _) = select(AppState::new(), "project-a");
    let (state, launch) = request(state, "{}");
    assert!(state.view().video.unwrap().launching);

    // A second click while the start is in flight does not duplicate the job.
    let (state, effects) = update(
        state,
        Msg::VideoRequested {
            report: "{}".to_string(),
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = started(state, "project-a", launch, "req-9");
    assert!(matches!(effects.as_slice(), [Effect::StartWatchTimer { interval, .. }] if interval.as_secs() == 12));
    let job = state.watcher().job().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.request_id.as_deref(), Some("req-9"));
}

#[test]
fn ceiling_fails_exactly_on_tick_seventy_six() {
    init_logging();
    let (mut state, epoch) = pending_for("project-a");

    for attempt in 1..=75u32 {
        let (next, effects) = update(state, Msg::WatchTick { epoch });
        assert_eq!(polls_for(&effects, "project-a").len(), 1, "tick {attempt}");
        let (next, effects) = update(
            next,
            Msg::VideoStatusReceived {
                subject: subject("project-a"),
                epoch,
                result: Ok(RemoteJobStatus::Pending),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(next.watcher().attempts(), attempt);
        assert_eq!(next.view().video.unwrap().status, JobStatus::Pending);
        state = next;
    }

    let (state, effects) = update(state, Msg::WatchTick { epoch });
    assert!(polls_for(&effects, "project-a").is_empty());
    assert!(effects.contains(&Effect::StopWatchTimer { epoch }));
    let notice = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Notify(notice) => Some(notice),
            _ => None,
        })
        .expect("timeout notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.retry, Some(RetryTarget::VideoJob));
    assert_eq!(state.view().video.unwrap().status, JobStatus::Failed);
    assert!(!state.watcher().is_polling());

    // The timer may still fire once before it is torn down; that tick is inert.
    let (_state, effects) = update(state, Msg::WatchTick { epoch });
    assert!(effects.is_empty());
}

#[test]
fn switching_subject_stops_polling_the_old_one() {
    init_logging();
    let (state, epoch) = pending_for("project-a");
    let (state, effects) = update(state, Msg::WatchTick { epoch });
    assert_eq!(polls_for(&effects, "project-a").len(), 1);

    let (state, effects) = select(state, "project-b");
    // Stop comes first, then the single fetch for the new subject.
    assert_eq!(effects[0], Effect::StopWatchTimer { epoch });
    assert!(matches!(
        &effects[1],
        Effect::FetchLastKnown { subject, .. } if subject.as_str() == "project-b"
    ));
    assert_eq!(effects.len(), 2);

    // A tick from the old timer and a late response for A change nothing.
    let (state, effects) = update(state, Msg::WatchTick { epoch });
    assert!(polls_for(&effects, "project-a").is_empty());
    let (state, effects) = update(
        state,
        Msg::VideoStatusReceived {
            subject: subject("project-a"),
            epoch,
            result: Ok(RemoteJobStatus::Done {
                url: "https://cdn.example.com/a.mp4".to_string(),
                generated_at: None,
            }),
        },
    );
    assert!(effects.is_empty());
    let view = state.view().video.unwrap();
    assert_eq!(view.subject, subject("project-b"));
    assert_eq!(view.status, JobStatus::Idle);
    assert_eq!(view.result_url, None);
}

#[test]
fn last_known_state_is_adopted_without_polling() {
    init_logging();
    let (state, effects) = select(AppState::new(), "project-b");
    let epoch = match effects.as_slice() {
        [Effect::FetchLastKnown { epoch, .. }] => *epoch,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, effects) = update(
        state,
        Msg::LastKnownReceived {
            subject: subject("project-b"),
            epoch,
            result: Ok(RemoteJobStatus::Done {
                url: "https://cdn.example.com/b.mp4".to_string(),
                generated_at: Some("2026-10-01T08:00:00Z".to_string()),
            }),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.watcher().is_polling());
    let view = state.view().video.unwrap();
    assert_eq!(view.status, JobStatus::Done);
    assert_eq!(view.result_url.as_deref(), Some("https://cdn.example.com/b.mp4"));
    assert_eq!(view.generated_at.as_deref(), Some("2026-10-01T08:00:00Z"));
}

#[test]
fn check_now_leaves_counter_and_timer_alone() {
    init_logging();
    let (state, epoch) = pending_for("project-a");
    let (state, _) = update(state, Msg::WatchTick { epoch });
    assert_eq!(state.watcher().attempts(), 1);

    let (state, effects) = update(state, Msg::CheckNowClicked);
    assert_eq!(
        effects,
        vec![Effect::PollVideoJob {
            subject: subject("project-a"),
            epoch,
        }]
    );
    assert_eq!(state.watcher().attempts(), 1);
    assert!(state.watcher().is_polling());
    assert_eq!(state.watcher().epoch(), epoch);

    let (state, effects) = update(
        state,
        Msg::VideoStatusReceived {
            subject: subject("project-a"),
            epoch,
            result: Ok(RemoteJobStatus::Done {
                url: "https://cdn.example.com/a.mp4".to_string(),
                generated_at: Some("2026-10-18T10:00:00Z".to_string()),
            }),
        },
    );
    assert_eq!(effects[0], Effect::StopWatchTimer { epoch });
    let job = state.watcher().job().unwrap();
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.result_url.as_deref(), Some("https://cdn.example.com/a.mp4"));
}

#[test]
fn missing_remote_job_resets_to_idle_without_error() {
    init_logging();
    let (state, epoch) = pending_for("project-a");
    let (state, _) = update(state, Msg::WatchTick { epoch });
    let (state, effects) = update(
        state,
        Msg::VideoStatusReceived {
            subject: subject("project-a"),
            epoch,
            result: Ok(RemoteJobStatus::NotFound),
        },
    );
    assert_eq!(effects, vec![Effect::StopWatchTimer { epoch }]);
    let job = state.watcher().job().unwrap();
    assert_eq!(job.status, JobStatus::Idle);
    assert_eq!(job.request_id, None);
}

#[test]
fn retry_after_failure_starts_a_new_job() {
    init_logging();
    let (state, epoch) = pending_for("project-a");
    let (state, _) = update(state, Msg::WatchTick { epoch });
    let (state, _) = update(
        state,
        Msg::VideoStatusReceived {
            subject: subject("project-a"),
            epoch,
            result: Ok(RemoteJobStatus::Failed),
        },
    );
    assert_eq!(state.view().video.unwrap().status, JobStatus::Failed);

    let (state, effects) = update(state, Msg::RetryClicked(RetryTarget::VideoJob));
    let launch = match effects.as_slice() {
        [Effect::StartVideoJob {
            subject: launched,
            epoch,
            report,
            language,
        }] => {
            assert_eq!(launched, &subject("project-a"));
            assert_eq!(report, "{\"score\":71}");
            assert_eq!(language, "en");
            *epoch
        }
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, effects) = started(state, "project-a", launch, "req-2");
    let new_epoch = match effects.as_slice() {
        [Effect::StartWatchTimer { epoch, .. }] => *epoch,
        other => panic!("unexpected effects {other:?}"),
    };
    assert!(new_epoch > epoch);
    assert_eq!(state.watcher().attempts(), 0);
    assert_eq!(
        state.watcher().job().unwrap().request_id.as_deref(),
        Some("req-2")
    );
}

#[test]
fn start_from_an_abandoned_launch_is_dropped() {
    init_logging();
    let (state, _) = select(AppState::new(), "project-a");
    let (state, first) = request(state, "{}");
    let (state, _) = select(state, "project-b");
    let (state, _) = select(state, "project-a");
    let (state, second) = request(state, "{}");
    assert_ne!(first, second);

    // The first launch answers late; it belongs to a request the user left behind.
    let (state, effects) = started(state, "project-a", first, "req-old");
    assert!(effects.is_empty());
    assert!(state.view().video.unwrap().launching);
    assert_eq!(state.watcher().job().unwrap().request_id, None);

    let (state, effects) = started(state, "project-a", second, "req-new");
    assert!(matches!(effects.as_slice(), [Effect::StartWatchTimer { .. }]));
    let job = state.watcher().job().unwrap();
    assert_eq!(job.request_id.as_deref(), Some("req-new"));
    assert_eq!(job.status, JobStatus::Pending);
}

#[test]
fn unmount_stops_the_timer() {
    init_logging();
    let (state, epoch) = pending_for("project-a");
    let (state, effects) = update(state, Msg::ViewUnmounted);
    assert_eq!(effects, vec![Effect::StopWatchTimer { epoch }]);
    assert!(state.view().video.is_none());

    let (_state, effects) = update(state, Msg::WatchTick { epoch });
    assert!(effects.is_empty());
}

#[test]
fn video_request_without_subject_is_refused() {
    init_logging();
    let (_state, effects) = update(
        AppState::new(),
        Msg::VideoRequested {
            report: "{}".to_string(),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::Notify(n)] if n.level == NoticeLevel::Warning));
}
