//! Production shutdown path
//!
//! The production loop must take the clean-shutdown path on SIGTERM (how
//! systemd stops a service), not only on SIGINT. The test delivers a real
//! SIGTERM to its own process; the loop's signal handler consumes it and the
//! loop must return promptly.

#![cfg(unix)]

mod common;

use common::*;
use dyndns_core::Reconciler;
use std::process::Command;
use std::time::Duration;

#[tokio::test]
async fn sigterm_stops_the_production_loop_cleanly() {
    let resolver = MockIpResolver::returning("1.2.3.4");
    let provider = MockDnsProvider::with_records(vec![record("rec-1", "a.example.com", "1.2.3.4")]);

    let (reconciler, _event_rx) = Reconciler::new(
        Box::new(resolver),
        Box::new(provider),
        &test_config(&["a.example.com"]),
    )
    .expect("reconciler construction succeeds");

    let handle = tokio::spawn(async move { reconciler.run().await });

    // Give the loop time to finish the first cycle and install the signal
    // handler before the signal arrives.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .expect("kill command runs");
    assert!(status.success(), "SIGTERM delivery failed");

    let joined = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop must stop promptly on SIGTERM");
    joined.expect("join succeeds").expect("clean shutdown");
}
