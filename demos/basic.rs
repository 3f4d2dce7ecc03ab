//! Basic example feeding simulated device output through the log adapter.
//!
//! Shows the three stages at work: routine noise is dropped, peer
//! identifiers are rewritten once the peer set is known, and a line repeated
//! in a tight loop is throttled to the configured burst.

use std::time::Duration;
use tunnel_log_throttle::{DeviceLogger, Peer, PublicKey, TunnelLogger};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Allow 3 lines per format back to back, then one more per second
    let logger = TunnelLogger::builder()
        .with_interval(Duration::from_secs(1))
        .with_burst(3)
        .build()
        .expect("valid config");

    let key = PublicKey::from_base64("AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=")
        .expect("valid key");
    let wire = key.wire_identifier();

    println!("=== Basic Tunnel Logging Example ===\n");

    println!("Routine chatter (dropped):");
    logger.verbose("Routine: {} - started", &[&"decryption worker"]);
    logger.verbose("Interface up requested", &[]);

    println!("\nBefore the peer set is known (identifier left as is):");
    logger.verbose("{} - Sending handshake initiation", &[&wire]);

    logger.set_peers(&[Peer::new(key).with_name("laptop")]);

    println!("\nAfter set_peers (identifier rewritten to {}):", key.short_string());
    logger.verbose("{} - Received handshake response", &[&wire]);

    println!("\nA repeated error (only the first 3 of 10 are shown):");
    for attempt in 1..=10 {
        logger.error("Failed to bind {} (attempt {})", &[&"utun4", &attempt]);
    }

    println!("\nAfter waiting one interval (one more is allowed):");
    std::thread::sleep(Duration::from_secs(1));
    logger.error("Failed to bind {} (attempt {})", &[&"utun4", &11]);

    println!("\n=== Example Complete ===");
}
