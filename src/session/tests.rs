use rstest::{fixture, rstest};
use tokio::sync::oneshot::error::TryRecvError;

use super::*;
use crate::{
    call::Presentation,
    notification::{MT_CODE_FORWARDED_CALL, NotificationType},
    outcome::{ResultReceiver, result_channel},
    parcel::ParcelError,
    quirks::ProfileKind,
    test_helpers::{
        CallFields,
        RecordingTransport,
        call_list_body,
        data_call,
        data_call_list_body,
        solicited,
        supp_service_body,
        unsolicited,
    },
    test_helpers::tracing::{capture_events, find_event},
    transport::TransportError,
};
use tracing::Level;

struct Harness {
    session: Session<RecordingTransport>,
    transport: RecordingTransport,
}

impl Harness {
    fn new(profile: ProfileKind) -> Self {
        let transport = RecordingTransport::new();
        let session = Session::new(transport.clone(), profile.build(), SessionConfig::default());
        Self { session, transport }
    }

    fn submit(&mut self, request: Request) -> (Option<Serial>, ResultReceiver) {
        let (sink, rx) = result_channel();
        let serial = self.session.submit(request, Some(sink));
        (serial, rx)
    }

    fn observe_data_calls(&mut self, calls: &[DataCall]) {
        self.session.handle_record(&unsolicited(
            UnsolicitedKind::DataCallListChanged,
            data_call_list_body(calls),
        ));
    }
}

#[fixture]
fn wrigley() -> Harness { Harness::new(ProfileKind::MotoWrigley3g) }

#[fixture]
fn stock() -> Harness { Harness::new(ProfileKind::Stock) }

fn setup_params() -> SetupDataCall {
    SetupDataCall {
        radio_technology: "1".to_owned(),
        profile: "0".to_owned(),
        apn: "internet".to_owned(),
        user: "guest".to_owned(),
        password: "secret".to_owned(),
        auth_type: "3".to_owned(),
        protocol: "IP".to_owned(),
    }
}

const fn teardown(cid: i32) -> Request {
    Request::DeactivateDataCall(DeactivateDataCall { cid, reason: 0 })
}

#[rstest]
fn call_list_is_sorted_and_privacy_follows_wire_order(mut wrigley: Harness) {
    let mut privacy = wrigley.session.subscribe_voice_privacy();
    let (serial, mut rx) = wrigley.submit(Request::GetCurrentCalls);
    let serial = serial.expect("sent");
    let mut third = CallFields::new(3);
    third.voice_privacy = true;
    let body = call_list_body(&[third, CallFields::new(1), CallFields::new(2)]);

    wrigley.session.handle_record(&solicited(serial, 0, body));

    let Ok(Ok(Response::Calls(calls))) = rx.try_recv() else {
        panic!("expected a call list");
    };
    let indices: Vec<_> = calls.iter().map(|call| call.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert_eq!(privacy.try_recv().expect("first"), VoicePrivacy::Enabled);
    assert_eq!(privacy.try_recv().expect("second"), VoicePrivacy::Disabled);
    assert_eq!(privacy.try_recv().expect("third"), VoicePrivacy::Disabled);
}

#[rstest]
fn outgoing_presentation_is_allowed_under_wrigley(mut wrigley: Harness) {
    let (serial, mut rx) = wrigley.submit(Request::GetCurrentCalls);
    let mut call = CallFields::new(1);
    call.presentation = 2;
    let body = call_list_body(&[call]);

    wrigley
        .session
        .handle_record(&solicited(serial.expect("sent"), 0, body));

    let Ok(Ok(Response::Calls(calls))) = rx.try_recv() else {
        panic!("expected a call list");
    };
    assert_eq!(calls[0].number_presentation, Presentation::Allowed);
}

#[rstest]
fn outgoing_presentation_passes_through_under_stock(mut stock: Harness) {
    let (serial, mut rx) = stock.submit(Request::GetCurrentCalls);
    let mut call = CallFields::new(1);
    call.presentation = 2;
    let body = call_list_body(&[call]);

    stock.session.handle_record(&solicited(serial.expect("sent"), 0, body));

    let Ok(Ok(Response::Calls(calls))) = rx.try_recv() else {
        panic!("expected a call list");
    };
    assert_eq!(calls[0].number_presentation, Presentation::Unknown);
}

#[rstest]
fn idle_teardown_completes_locally(mut wrigley: Harness) {
    wrigley.observe_data_calls(&[]);

    let (serial, mut rx) = wrigley.submit(teardown(1));

    assert_eq!(serial, None);
    assert_eq!(rx.try_recv().expect("immediate outcome"), Ok(Response::Empty));
    assert_eq!(wrigley.transport.sent_count(), 0);
    assert!(wrigley.session.registry().is_empty());
    assert_eq!(wrigley.session.wake_lock_deadline(), None);
}

#[rstest]
fn active_teardown_sends_one_frame_and_passes_outcome_through(mut wrigley: Harness) {
    wrigley.observe_data_calls(&[data_call(1)]);

    let (serial, mut rx) = wrigley.submit(teardown(1));
    let serial = serial.expect("forwarded");

    let sent = wrigley.transport.sent_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, RequestKind::DeactivateDataCall);
    assert_eq!(
        DeactivateDataCall::decode(&sent[0].body).expect("decode"),
        DeactivateDataCall { cid: 1, reason: 0 }
    );
    wrigley.session.handle_record(&solicited(serial, 2, Vec::new()));
    assert_eq!(rx.try_recv().expect("outcome"), Err(CommandError::Modem(2)));
}

#[rstest]
fn teardown_is_forwarded_before_any_list_arrives(mut wrigley: Harness) {
    assert_eq!(wrigley.session.data_call_count(), None);

    let (serial, _rx) = wrigley.submit(teardown(1));

    assert!(serial.is_some());
    assert_eq!(wrigley.transport.sent_count(), 1);
}

#[rstest]
fn stock_profile_always_forwards_teardown(mut stock: Harness) {
    stock.observe_data_calls(&[]);

    let (serial, _rx) = stock.submit(teardown(1));

    assert!(serial.is_some());
    assert_eq!(stock.transport.sent_count(), 1);
}

#[rstest]
fn data_call_list_response_updates_count(mut wrigley: Harness) {
    let (serial, mut rx) = wrigley.submit(Request::DataCallList);
    let body = data_call_list_body(&[data_call(1), data_call(2)]);

    wrigley
        .session
        .handle_record(&solicited(serial.expect("sent"), 0, body));

    assert_eq!(wrigley.session.data_call_count(), Some(2));
    let Ok(Ok(Response::DataCalls(calls))) = rx.try_recv() else {
        panic!("expected data calls");
    };
    assert_eq!(calls.len(), 2);
}

#[rstest]
fn setup_answered_in_time_ignores_later_timeout(mut wrigley: Harness) {
    let (serial, mut rx) = wrigley.submit(Request::SetupDataCall(setup_params()));
    let serial = serial.expect("sent");
    assert_eq!(wrigley.session.registry().setup_data_call(), Some(serial));

    let body = data_call_list_body(&[data_call(1)]);
    wrigley.session.handle_record(&solicited(serial, 0, body));
    let reaped = wrigley.session.handle_wake_lock_timeout();

    assert_eq!(reaped, 0);
    assert_eq!(
        rx.try_recv().expect("single outcome"),
        Ok(Response::DataCalls(vec![data_call(1)]))
    );
    assert_eq!(wrigley.session.registry().setup_data_call(), None);
}

#[rstest]
fn unanswered_setup_is_reaped_and_late_response_ignored(mut wrigley: Harness) {
    let (serial, mut rx) = wrigley.submit(Request::SetupDataCall(setup_params()));
    let serial = serial.expect("sent");

    assert_eq!(wrigley.session.handle_wake_lock_timeout(), 1);
    assert_eq!(
        rx.try_recv().expect("reaped"),
        Err(CommandError::RadioNotAvailable)
    );

    let body = data_call_list_body(&[data_call(1)]);
    wrigley.session.handle_record(&solicited(serial, 0, body));

    assert!(wrigley.session.registry().is_empty());
    assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
}

#[rstest]
fn stock_profile_keeps_unanswered_setup_pending(mut stock: Harness) {
    let (serial, mut rx) = stock.submit(Request::SetupDataCall(setup_params()));

    assert_eq!(stock.session.handle_wake_lock_timeout(), 0);

    assert!(stock.session.registry().contains(serial.expect("sent")));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[rstest]
fn setup_request_carries_seven_parameters_in_order(mut wrigley: Harness) {
    let params = setup_params();
    let (_serial, _rx) = wrigley.submit(Request::SetupDataCall(params.clone()));

    let sent = wrigley.transport.sent_requests();

    assert_eq!(sent[0].kind, RequestKind::SetupDataCall);
    assert_eq!(SetupDataCall::decode(&sent[0].body).expect("decode"), params);
}

#[rstest]
fn malformed_body_fails_only_its_request(mut wrigley: Harness) {
    let (first, mut first_rx) = wrigley.submit(Request::GetCurrentCalls);
    let (second, mut second_rx) = wrigley.submit(Request::DataCallList);

    wrigley
        .session
        .handle_record(&solicited(first.expect("sent"), 0, vec![0, 0, 0, 1]));

    assert!(matches!(
        first_rx.try_recv().expect("outcome"),
        Err(CommandError::MalformedFrame(ParcelError::MalformedFrame { .. }))
    ));
    assert!(wrigley.session.registry().contains(second.expect("sent")));
    assert_eq!(second_rx.try_recv(), Err(TryRecvError::Empty));
}

#[rstest]
fn response_for_unknown_serial_is_ignored(mut wrigley: Harness) {
    let (serial, mut rx) = wrigley.submit(Request::GetCurrentCalls);

    wrigley
        .session
        .handle_record(&solicited(Serial::new(999), 0, call_list_body(&[])));

    assert!(wrigley.session.registry().contains(serial.expect("sent")));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[rstest]
fn raw_requests_return_their_body(mut stock: Harness) {
    let (serial, mut rx) = stock.submit(Request::Raw {
        kind: RequestKind::Other(61),
        body: vec![0, 0, 0, 1],
    });

    stock
        .session
        .handle_record(&solicited(serial.expect("sent"), 0, vec![9, 9]));

    assert_eq!(rx.try_recv().expect("outcome"), Ok(Response::Raw(vec![9, 9])));
}

#[rstest]
#[case::wrigley(ProfileKind::MotoWrigley3g, MT_CODE_FORWARDED_CALL)]
#[case::stock(ProfileKind::Stock, 10)]
fn supp_service_notification_is_corrected_per_profile(
    #[case] profile: ProfileKind,
    #[case] expected: i32,
) {
    let mut harness = Harness::new(profile);
    let mut events = harness.session.subscribe_unsolicited();

    harness.session.handle_record(&unsolicited(
        UnsolicitedKind::SuppSvcNotification,
        supp_service_body(1, 10),
    ));

    let Ok(UnsolicitedEvent::SuppService(notification)) = events.try_recv() else {
        panic!("expected a notification");
    };
    assert_eq!(notification.notification_type, NotificationType::MobileTerminated);
    assert_eq!(notification.code, expected);
}

#[rstest]
fn data_call_list_changed_is_published_and_counted(mut wrigley: Harness) {
    let mut events = wrigley.session.subscribe_unsolicited();

    wrigley.observe_data_calls(&[data_call(4)]);

    assert_eq!(wrigley.session.data_call_count(), Some(1));
    assert_eq!(
        events.try_recv().expect("published"),
        UnsolicitedEvent::DataCallListChanged(vec![data_call(4)])
    );
}

#[rstest]
fn transport_failure_fails_request() {
    let transport = RecordingTransport::failing(TransportError::QueueClosed);
    let mut session = Session::new(
        transport,
        ProfileKind::MotoWrigley3g.build(),
        SessionConfig::default(),
    );
    let (sink, mut rx) = result_channel();

    let serial = session.submit(Request::GetCurrentCalls, Some(sink));

    assert_eq!(serial, None);
    assert_eq!(rx.try_recv().expect("outcome"), Err(CommandError::RadioNotAvailable));
    assert!(session.registry().is_empty());
    assert_eq!(session.wake_lock_deadline(), None);
}

#[rstest]
fn wake_lock_is_held_until_registry_drains(mut wrigley: Harness) {
    let (first, _first_rx) = wrigley.submit(Request::GetCurrentCalls);
    let (second, _second_rx) = wrigley.submit(Request::DataCallList);
    assert!(wrigley.session.wake_lock_deadline().is_some());

    wrigley
        .session
        .handle_record(&solicited(first.expect("sent"), 0, call_list_body(&[])));
    assert!(wrigley.session.wake_lock_deadline().is_some());

    let body = data_call_list_body(&[]);
    wrigley
        .session
        .handle_record(&solicited(second.expect("sent"), 0, body));
    assert_eq!(wrigley.session.wake_lock_deadline(), None);
}

#[rstest]
fn shutdown_fails_everything_pending(mut wrigley: Harness) {
    let (_first, mut first_rx) = wrigley.submit(Request::GetCurrentCalls);
    let (_second, mut second_rx) = wrigley.submit(Request::SetupDataCall(setup_params()));

    assert_eq!(wrigley.session.shutdown(), 2);

    assert_eq!(first_rx.try_recv().expect("first"), Err(CommandError::RadioNotAvailable));
    assert_eq!(second_rx.try_recv().expect("second"), Err(CommandError::RadioNotAvailable));
    assert_eq!(wrigley.session.registry().setup_data_call(), None);
}

#[rstest]
fn serials_are_distinct(mut stock: Harness) {
    let (first, _a) = stock.submit(Request::GetCurrentCalls);
    let (second, _b) = stock.submit(Request::GetCurrentCalls);

    assert_ne!(first, second);
}

#[rstest]
fn raw_idle_teardown_completes_locally(mut wrigley: Harness) {
    wrigley.observe_data_calls(&[]);

    let (serial, mut rx) = wrigley.submit(Request::Raw {
        kind: RequestKind::DeactivateDataCall,
        body: DeactivateDataCall { cid: 1, reason: 0 }.encode(),
    });

    assert_eq!(serial, None);
    assert_eq!(rx.try_recv().expect("immediate outcome"), Ok(Response::Empty));
    assert_eq!(wrigley.transport.sent_count(), 0);
}

#[rstest]
fn raw_teardown_with_undecodable_body_is_forwarded(mut wrigley: Harness) {
    wrigley.observe_data_calls(&[]);

    let (serial, _rx) = wrigley.submit(Request::Raw {
        kind: RequestKind::DeactivateDataCall,
        body: vec![0, 0],
    });

    assert!(serial.is_some());
    assert_eq!(wrigley.transport.sent_count(), 1);
}

#[rstest]
fn truncated_envelope_fails_the_request_it_names(mut wrigley: Harness) {
    let (serial, mut rx) = wrigley.submit(Request::GetCurrentCalls);
    let serial = serial.expect("sent");
    let mut record = 0_i32.to_be_bytes().to_vec();
    record.extend_from_slice(&serial.as_i32().to_be_bytes());

    let ((), events) = capture_events(|| wrigley.session.handle_record(&record));

    assert!(matches!(
        rx.try_recv().expect("outcome"),
        Err(CommandError::MalformedFrame(ParcelError::MalformedFrame { .. }))
    ));
    assert!(wrigley.session.registry().is_empty());
    assert_eq!(wrigley.session.wake_lock_deadline(), None);
    let event = find_event(&events, Level::WARN, "truncated response envelope")
        .expect("truncation logged");
    assert_eq!(event.field("kind"), Some("GET_CURRENT_CALLS"));
    assert_eq!(event.field("serial"), Some(serial.to_string().as_str()));
}

#[rstest]
fn truncated_envelope_without_serial_touches_nothing(mut wrigley: Harness) {
    let (serial, mut rx) = wrigley.submit(Request::GetCurrentCalls);

    wrigley.session.handle_record(&[0, 0, 0, 0, 0, 0]);

    assert!(wrigley.session.registry().contains(serial.expect("sent")));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}
