//! End-to-end tests of the filter, rewrite and throttle pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tunnel_log_throttle::infrastructure::mocks::{CaptureSink, MockClock};
use tunnel_log_throttle::{
    wire_identifier, DeviceLogger, DropRule, Outcome, Peer, PublicKey, Severity, TunnelLogger,
};

fn logger_with(burst: usize) -> (TunnelLogger, CaptureSink, Arc<MockClock>) {
    let sink = CaptureSink::new();
    let clock = Arc::new(MockClock::new(Instant::now()));
    let logger = TunnelLogger::builder()
        .with_interval(Duration::from_secs(5))
        .with_burst(burst)
        .with_clock(clock.clone())
        .with_sink(sink.clone())
        .build()
        .unwrap();
    (logger, sink, clock)
}

fn sequential_key() -> PublicKey {
    let mut bytes = [0u8; 32];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = i as u8;
    }
    PublicKey::new(bytes)
}

#[test]
fn test_drop_rules_see_formatted_text() {
    let (logger, sink, _) = logger_with(5);

    assert_eq!(
        logger.log(Severity::Verbose, "Routine: {} - starting", &[&"Foo"]),
        Outcome::Filtered(DropRule::RoutineNoise)
    );
    assert_eq!(
        logger.log(
            Severity::Error,
            "{} - Failed to send data packet: {}",
            &[&"peer(AAAA…AAAA)", &"EIO"]
        ),
        Outcome::Filtered(DropRule::BenignSendFailure)
    );
    assert_eq!(
        logger.log(Severity::Verbose, "Interface {} requested", &[&"down"]),
        Outcome::Filtered(DropRule::InterfaceToggle)
    );
    assert_eq!(sink.count(), 0);

    // The receive routine is the one routine worth keeping
    assert!(logger
        .log(Severity::Verbose, "Routine: {} - ready", &[&"receive incoming"])
        .is_emitted());
    assert_eq!(
        sink.messages(),
        vec!["<RATELIMITED>[v2] Routine: receive incoming - ready".to_string()]
    );
}

#[test]
fn test_filtered_lines_do_not_spend_tokens() {
    let (logger, sink, _) = logger_with(1);

    for _ in 0..10 {
        logger.verbose("Routine: {} - stopped", &[&"handshake worker"]);
    }
    assert_eq!(logger.key_count(), 0);

    logger.verbose("Routine: {} - stopped", &[&"receive incoming"]);
    assert_eq!(sink.count(), 1);
}

#[test]
fn test_rewrite_round_trip() {
    let (logger, sink, _) = logger_with(5);
    let key = sequential_key();
    assert_eq!(key.wire_identifier(), "peer(AAEC…dHh8)");

    logger.set_peers(&[Peer::new(key).with_name("laptop")]);
    let outcome = logger.log(
        Severity::Verbose,
        "{} - Received handshake response",
        &[&key.wire_identifier()],
    );

    assert_eq!(outcome, Outcome::Emitted { rewritten: true });
    let line = &sink.get_captured()[0];
    assert_eq!(line.format, "<RATELIMITED>{}");
    assert_eq!(
        line.message,
        "<RATELIMITED>[v2] [AAECA] - Received handshake response"
    );
}

#[test]
fn test_malformed_key_identifier_is_invalid() {
    assert_eq!(wire_identifier(&[1, 2, 3]), "peer(invalid)");
    assert_eq!(wire_identifier(&[0u8; 33]), "peer(invalid)");
    assert_eq!(wire_identifier(&[0u8; 32]), "peer(AAAA…AAAA)");
}

#[test]
fn test_peer_update_replaces_whole_table() {
    let (logger, sink, _) = logger_with(10);
    let first = PublicKey::new([0u8; 32]);
    let second = sequential_key();

    logger.set_peers(&[Peer::new(first)]);
    logger.error("{} - Keepalive", &[&first.wire_identifier()]);
    logger.error("{} - Keepalive", &[&second.wire_identifier()]);

    logger.set_peers(&[Peer::new(second)]);
    logger.error("{} - Keepalive", &[&first.wire_identifier()]);
    logger.error("{} - Keepalive", &[&second.wire_identifier()]);

    assert_eq!(
        sink.messages(),
        vec![
            "<RATELIMITED>[AAAAA] - Keepalive".to_string(),
            "<RATELIMITED>peer(AAEC…dHh8) - Keepalive".to_string(),
            "<RATELIMITED>peer(AAAA…AAAA) - Keepalive".to_string(),
            "<RATELIMITED>[AAECA] - Keepalive".to_string(),
        ]
    );
}

#[test]
fn test_each_format_has_its_own_bucket() {
    let (logger, sink, _) = logger_with(2);

    for _ in 0..10 {
        logger.error("Handshake for {} did not complete", &[&"peer"]);
    }
    logger.error("Sending keepalive packet", &[]);

    assert_eq!(sink.count(), 3);
    assert_eq!(logger.key_count(), 2);
}

#[test]
fn test_arguments_do_not_split_buckets() {
    let (logger, sink, _) = logger_with(2);

    for i in 0..10 {
        logger.verbose("Received {} bytes", &[&i]);
    }

    assert_eq!(
        sink.messages(),
        vec![
            "<RATELIMITED>[v2] Received 0 bytes".to_string(),
            "<RATELIMITED>[v2] Received 1 bytes".to_string(),
        ]
    );
}

#[test]
fn test_throttled_format_recovers_one_line_per_interval() {
    let (logger, sink, clock) = logger_with(2);

    for _ in 0..5 {
        logger.error("Decryption failed", &[]);
    }
    assert_eq!(sink.count(), 2);

    clock.advance(Duration::from_secs(4));
    logger.error("Decryption failed", &[]);
    assert_eq!(sink.count(), 2);

    // 8 seconds elapsed in total: one whole interval, three seconds carried
    clock.advance(Duration::from_secs(4));
    logger.error("Decryption failed", &[]);
    logger.error("Decryption failed", &[]);
    assert_eq!(sink.count(), 3);

    clock.advance(Duration::from_secs(2));
    logger.error("Decryption failed", &[]);
    assert_eq!(sink.count(), 4);
}

#[test]
fn test_mismatched_arguments_pass_through() {
    let (logger, sink, _) = logger_with(5);

    logger.error("{} and {}", &[&"one"]);
    logger.error("only {}", &[&"one", &"two"]);

    assert_eq!(
        sink.messages(),
        vec![
            "<RATELIMITED>one and {}".to_string(),
            "<RATELIMITED>only one".to_string(),
        ]
    );
}
