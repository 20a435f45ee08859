use genflow_core::{
    update, AppState, Effect, Epoch, Msg, NoticeLevel, ProgressSnapshot, RetryTarget, SubjectKey,
};

fn subject(key: &str) -> SubjectKey {
    SubjectKey::new(key)
}

fn snapshot(processed: u64, total: u64) -> ProgressSnapshot {
    ProgressSnapshot {
        processed,
        total,
        percentage_point: (processed * 100 / total.max(1)) as u8,
        message: format!("Scoring prompt {processed} of {total}"),
    }
}

fn computing(key: &str) -> (AppState, Epoch) {
    let (state, _) = update(AppState::new(), Msg::SubjectSelected(subject(key)));
    let (state, effects) = update(
        state,
        Msg::LongComputationRequested {
            params: "{\"models\":[\"gpt\"]}".to_string(),
        },
    );
    assert!(matches!(
        effects.first(),
        Some(Effect::StartLongComputation { .. })
    ));
    let epoch = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartSampling { epoch, interval, .. } => {
                assert_eq!(interval.as_millis(), 800);
                Some(*epoch)
            }
            _ => None,
        })
        .expect("sampling started");
    (state, epoch)
}

#[test]
fn samples_are_surfaced_while_in_flight() {
    let (state, epoch) = computing("domain-1");
    let (state, effects) = update(state, Msg::SampleTick { epoch });
    assert_eq!(
        effects,
        vec![Effect::PollProgress {
            subject: subject("domain-1"),
            epoch,
        }]
    );
    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            subject: subject("domain-1"),
            epoch,
            result: Ok(snapshot(3, 12)),
        },
    );
    let view = state.view();
    assert!(view.computing);
    assert_eq!(view.progress, Some(snapshot(3, 12)));
}

#[test]
fn finishing_discards_snapshot_and_drops_late_samples() {
    let (state, epoch) = computing("domain-1");
    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            subject: subject("domain-1"),
            epoch,
            result: Ok(snapshot(5, 12)),
        },
    );
    let (state, effects) = update(
        state,
        Msg::LongComputationFinished {
            subject: subject("domain-1"),
            epoch,
            result: Ok(true),
        },
    );
    assert_eq!(effects[0], Effect::StopSampling { epoch });
    assert!(state.view().progress.is_none());
    assert!(!state.view().computing);

    // A poll that was already in flight lands after the stop.
    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            subject: subject("domain-1"),
            epoch,
            result: Ok(snapshot(12, 12)),
        },
    );
    assert!(state.view().progress.is_none());
    let (_state, effects) = update(state, Msg::SampleTick { epoch });
    assert!(effects.is_empty());
}

#[test]
fn failed_computation_offers_retry() {
    let (state, epoch) = computing("domain-1");
    let (state, effects) = update(
        state,
        Msg::LongComputationFinished {
            subject: subject("domain-1"),
            epoch,
            result: Err("gateway timeout".to_string()),
        },
    );
    assert_eq!(effects[0], Effect::StopSampling { epoch });
    assert!(matches!(
        &effects[1],
        Effect::Notify(n) if n.level == NoticeLevel::Error && n.retry == Some(RetryTarget::LongComputation)
    ));

    let (state, effects) = update(state, Msg::RetryClicked(RetryTarget::LongComputation));
    assert!(matches!(
        effects.as_slice(),
        [Effect::StartLongComputation { params, .. }, Effect::StartSampling { .. }]
            if params == "{\"models\":[\"gpt\"]}"
    ));
    assert!(state.view().computing);
}

#[test]
fn subject_switch_stops_sampling() {
    let (state, epoch) = computing("domain-1");
    let (state, effects) = update(state, Msg::SubjectSelected(subject("domain-2")));
    assert_eq!(effects[0], Effect::StopSampling { epoch });
    assert!(!state.view().computing);

    // The original request returning later is ignored.
    let (_state, effects) = update(
        state,
        Msg::LongComputationFinished {
            subject: subject("domain-1"),
            epoch,
            result: Ok(true),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn completion_of_an_abandoned_request_is_dropped() {
    let (state, stale) = computing("domain-1");
    let (state, _) = update(state, Msg::SubjectSelected(subject("domain-2")));
    let (state, _) = update(state, Msg::SubjectSelected(subject("domain-1")));
    let (state, effects) = update(
        state,
        Msg::LongComputationRequested {
            params: "{}".to_string(),
        },
    );
    let current = match effects.as_slice() {
        [Effect::StartLongComputation { epoch, .. }, Effect::StartSampling { .. }] => *epoch,
        other => panic!("unexpected effects {other:?}"),
    };
    assert_ne!(stale, current);

    let (state, effects) = update(
        state,
        Msg::LongComputationFinished {
            subject: subject("domain-1"),
            epoch: stale,
            result: Ok(true),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().computing);

    let (state, effects) = update(
        state,
        Msg::LongComputationFinished {
            subject: subject("domain-1"),
            epoch: current,
            result: Ok(true),
        },
    );
    assert_eq!(effects[0], Effect::StopSampling { epoch: current });
    assert!(!state.view().computing);
}

#[test]
fn duplicate_request_while_in_flight_is_ignored() {
    let (state, _) = computing("domain-1");
    let (_state, effects) = update(
        state,
        Msg::LongComputationRequested {
            params: "{}".to_string(),
        },
    );
    assert!(effects.is_empty());
}
