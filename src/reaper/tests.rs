use rstest::rstest;
use tracing::Level;

use super::*;
use crate::{
    outcome::{Response, result_channel},
    quirks::{MotoWrigley3g, StockProfile},
    request_kind::RequestKind,
    serial::Serial,
    test_helpers::tracing::{capture_events, find_event},
};

#[rstest]
fn stock_profile_only_logs() {
    let reaper = TimeoutReaper::for_profile(&StockProfile);

    assert_eq!(reaper.stage_names().collect::<Vec<_>>(), vec!["pending-request-log"]);
}

#[rstest]
fn wrigley_profile_appends_setup_reaper_after_base_stage() {
    let reaper = TimeoutReaper::for_profile(&MotoWrigley3g);

    assert_eq!(
        reaper.stage_names().collect::<Vec<_>>(),
        vec!["pending-request-log", "setup-data-call-reaper"]
    );
}

#[rstest]
fn stale_setup_request_fails_with_radio_not_available() {
    let mut registry = RequestRegistry::new();
    let (sink, mut rx) = result_channel();
    let serial = Serial::new(7);
    registry
        .register(serial, RequestKind::SetupDataCall, Some(sink))
        .expect("register");
    let reaper = TimeoutReaper::for_profile(&MotoWrigley3g);

    let (removed, events) = capture_events(|| reaper.on_wake_lock_timeout(&mut registry));

    assert_eq!(removed, 1);
    assert!(registry.is_empty());
    assert_eq!(registry.setup_data_call(), None);
    assert_eq!(
        rx.try_recv().expect("outcome delivered"),
        Err(CommandError::RadioNotAvailable)
    );
    let event = find_event(&events, Level::ERROR, "stale SETUP_DATA_CALL")
        .expect("reaper logs the stale request");
    assert_eq!(event.field("serial"), Some("[0007]"));
}

#[rstest]
fn other_requests_survive_the_reaper() {
    let mut registry = RequestRegistry::new();
    let (sink, mut rx) = result_channel();
    registry
        .register(Serial::new(1), RequestKind::GetCurrentCalls, Some(sink))
        .expect("register");
    let reaper = TimeoutReaper::for_profile(&MotoWrigley3g);

    let (removed, events) = capture_events(|| reaper.on_wake_lock_timeout(&mut registry));

    assert_eq!(removed, 0);
    assert!(registry.contains(Serial::new(1)));
    assert!(rx.try_recv().is_err());
    let logged = find_event(&events, Level::WARN, "request still pending").expect("pending log");
    assert_eq!(logged.field("kind"), Some("GET_CURRENT_CALLS"));
}

#[rstest]
fn setup_request_answered_first_is_not_reaped() {
    let mut registry = RequestRegistry::new();
    let (sink, mut rx) = result_channel();
    let serial = Serial::new(3);
    registry
        .register(serial, RequestKind::SetupDataCall, Some(sink))
        .expect("register");
    let answered = registry.find_and_remove(serial).expect("response path wins");
    assert!(answered.complete(Ok(Response::Empty)));
    let reaper = TimeoutReaper::for_profile(&MotoWrigley3g);

    let removed = reaper.on_wake_lock_timeout(&mut registry);

    assert_eq!(removed, 0);
    assert_eq!(rx.try_recv().expect("single outcome"), Ok(Response::Empty));
}

#[rstest]
fn stock_profile_leaves_stale_setup_pending() {
    let mut registry = RequestRegistry::new();
    registry
        .register(Serial::new(9), RequestKind::SetupDataCall, None)
        .expect("register");
    let reaper = TimeoutReaper::for_profile(&StockProfile);

    assert_eq!(reaper.on_wake_lock_timeout(&mut registry), 0);
    assert_eq!(registry.setup_data_call(), Some(Serial::new(9)));
}

#[rstest]
fn setup_request_without_sink_is_released_quietly() {
    let mut registry = RequestRegistry::new();
    registry
        .register(Serial::new(4), RequestKind::SetupDataCall, None)
        .expect("register");
    let reaper = TimeoutReaper::new().with_stage(SetupDataCallReaper);

    let (removed, events) = capture_events(|| reaper.on_wake_lock_timeout(&mut registry));

    assert_eq!(removed, 1);
    assert!(registry.is_empty());
    assert!(find_event(&events, Level::ERROR, "stale SETUP_DATA_CALL").is_none());
}
