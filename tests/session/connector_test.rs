//! QR handshake state-machine tests.

use chatbridge::session::stream::{parse_event, LoginEvent};
use chatbridge::session::{SessionConnector, SessionPhase};

#[test]
fn begin_moves_idle_to_waiting_with_cleared_payload() {
    let mut connector = SessionConnector::new();
    assert_eq!(connector.phase(), SessionPhase::Idle);
    assert!(connector.begin());
    assert_eq!(connector.phase(), SessionPhase::Waiting);
    assert_eq!(connector.payload().image_data_uri, None);
    assert_eq!(connector.payload().status_code, None);
    assert_eq!(connector.payload().error_message, None);
}

#[test]
fn second_begin_is_rejected_without_side_effects() {
    let mut connector = SessionConnector::new();
    assert!(connector.begin());
    connector.apply(LoginEvent::Qr {
        image: "AAAA".to_owned(),
    });

    // At most one stream per session: the reentrant open must change nothing.
    assert!(!connector.begin());
    assert_eq!(connector.phase(), SessionPhase::Waiting);
    assert_eq!(
        connector.payload().image_data_uri.as_deref(),
        Some("data:image/png;base64,AAAA")
    );
}

#[test]
fn close_then_begin_establishes_a_fresh_handshake() {
    let mut connector = SessionConnector::new();
    assert!(connector.begin());
    connector.apply(LoginEvent::Status {
        code: "WAITING_SCAN".to_owned(),
    });
    connector.close();
    assert_eq!(connector.phase(), SessionPhase::Idle);
    assert_eq!(connector.payload().status_code, None);

    assert!(connector.begin());
    assert_eq!(connector.phase(), SessionPhase::Waiting);
}

#[test]
fn qr_status_success_sequence_reaches_connected() {
    let mut connector = SessionConnector::new();
    assert!(connector.begin());
    connector.apply(LoginEvent::Qr {
        image: "AAAA".to_owned(),
    });
    connector.apply(LoginEvent::Status {
        code: "WAITING_SCAN".to_owned(),
    });
    connector.apply(LoginEvent::Success);

    assert_eq!(connector.phase(), SessionPhase::Connected);
    assert_eq!(
        connector.payload().image_data_uri.as_deref(),
        Some("data:image/png;base64,AAAA")
    );
    assert_eq!(connector.payload().status_code.as_deref(), Some("WAITING_SCAN"));
    assert!(connector.take_session_refresh());
    assert!(!connector.take_session_refresh());
}

#[test]
fn error_event_keeps_the_handshake_waiting() {
    let mut connector = SessionConnector::new();
    assert!(connector.begin());
    connector.apply(LoginEvent::Error {
        message: "scan timed out upstream".to_owned(),
    });

    // The user may still complete the scan.
    assert_eq!(connector.phase(), SessionPhase::Waiting);
    assert_eq!(
        connector.payload().error_message.as_deref(),
        Some("scan timed out upstream")
    );
}

#[test]
fn stream_open_failure_releases_guard_and_keeps_hint() {
    let mut connector = SessionConnector::new();
    assert!(connector.begin());
    connector.fail_stream("connection refused".to_owned());

    assert_eq!(connector.phase(), SessionPhase::Idle);
    assert_eq!(
        connector.payload().error_message.as_deref(),
        Some("connection refused")
    );

    // The guard is released: a retry must succeed and start clean.
    assert!(connector.begin());
    assert_eq!(connector.payload().error_message, None);
}

#[test]
fn events_are_discarded_while_idle() {
    let mut connector = SessionConnector::new();
    connector.apply(LoginEvent::Success);
    assert_eq!(connector.phase(), SessionPhase::Idle);
    assert!(!connector.take_session_refresh());

    connector.apply(LoginEvent::Qr {
        image: "AAAA".to_owned(),
    });
    assert_eq!(connector.payload().image_data_uri, None);
}

#[test]
fn parse_event_covers_the_event_vocabulary() {
    assert_eq!(
        parse_event(r#"{"type":"qr","data":{"image":"AAAA"}}"#),
        Some(LoginEvent::Qr {
            image: "AAAA".to_owned()
        })
    );
    assert_eq!(
        parse_event(r#"{"type":"status","data":{"code":"WAITING_SCAN"}}"#),
        Some(LoginEvent::Status {
            code: "WAITING_SCAN".to_owned()
        })
    );
    assert_eq!(parse_event(r#"{"type":"success"}"#), Some(LoginEvent::Success));
    assert_eq!(
        parse_event(r#"{"type":"error","error":"boom"}"#),
        Some(LoginEvent::Error {
            message: "boom".to_owned()
        })
    );
}

#[test]
fn parse_event_skips_unknown_and_malformed_payloads() {
    assert_eq!(parse_event(r#"{"type":"heartbeat"}"#), None);
    assert_eq!(parse_event("not json"), None);
    assert_eq!(parse_event(r#"{"data":{"image":"AAAA"}}"#), None);
    // A qr event without an image payload is malformed, not an empty QR.
    assert_eq!(parse_event(r#"{"type":"qr","data":{}}"#), None);
}

#[test]
fn error_event_without_message_gets_a_generic_hint() {
    assert_eq!(
        parse_event(r#"{"type":"error"}"#),
        Some(LoginEvent::Error {
            message: "unknown stream error".to_owned()
        })
    );
}
