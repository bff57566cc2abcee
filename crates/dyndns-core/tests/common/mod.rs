//! Test doubles and common utilities for reconciler integration tests
//!
//! The mocks share their counters through `Arc`s, so a clone handed to the
//! reconciler can still be inspected by the test afterwards.

use dyndns_core::config::SyncConfig;
use dyndns_core::error::{Error, Result};
use dyndns_core::reconciler::ReconcilerEvent;
use dyndns_core::traits::{DnsProvider, DnsRecord, IpResolver};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// A mock IpResolver with a scripted response
#[derive(Clone)]
pub struct MockIpResolver {
    /// Scripted outcome: `Ok(ip)` or `Err(message)`
    response: Arc<Mutex<std::result::Result<String, String>>>,
    /// Call counter for resolve()
    resolve_call_count: Arc<AtomicUsize>,
}

impl MockIpResolver {
    /// Resolver that always returns the given address
    pub fn returning(ip: &str) -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(ip.to_string()))),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolver for which every lookup service has failed
    pub fn failing() -> Self {
        Self {
            response: Arc::new(Mutex::new(Err("all services failed".to_string()))),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpResolver for MockIpResolver {
    async fn resolve(&self) -> Result<String> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        match &*self.response.lock().unwrap() {
            Ok(ip) => Ok(ip.clone()),
            Err(msg) => Err(Error::ip_lookup(msg.clone())),
        }
    }
}

/// A mock DnsProvider with a scripted snapshot that tracks calls
#[derive(Clone)]
pub struct MockDnsProvider {
    /// Scripted fetch outcome
    snapshot: Arc<Mutex<std::result::Result<Vec<DnsRecord>, String>>>,
    /// Call counter for fetch_a_records()
    fetch_call_count: Arc<AtomicUsize>,
    /// Recorded (domain, record_id, new_ip) tuples from update calls
    update_calls: Arc<Mutex<Vec<(String, String, String)>>>,
    /// Domains whose updates are scripted to fail
    failing_domains: Arc<Mutex<HashSet<String>>>,
}

impl MockDnsProvider {
    /// Provider whose fetch returns the given snapshot
    pub fn with_records(records: Vec<DnsRecord>) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(Ok(records))),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(Mutex::new(Vec::new())),
            failing_domains: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Provider whose fetch fails (state unknown this cycle)
    pub fn failing_fetch() -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(Err("api unreachable".to_string()))),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(Mutex::new(Vec::new())),
            failing_domains: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Script update failures for a specific domain
    pub fn fail_updates_for(&self, domain: &str) {
        self.failing_domains
            .lock()
            .unwrap()
            .insert(domain.to_string());
    }

    /// Get the number of times fetch_a_records() was called
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    /// Get the recorded (domain, record_id, new_ip) update calls
    pub fn update_calls(&self) -> Vec<(String, String, String)> {
        self.update_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn fetch_a_records(&self) -> Result<Vec<DnsRecord>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        match &*self.snapshot.lock().unwrap() {
            Ok(records) => Ok(records.clone()),
            Err(msg) => Err(Error::provider("mock", msg.clone())),
        }
    }

    async fn update_record(&self, domain: &str, record_id: &str, new_ip: &str) -> Result<()> {
        self.update_calls.lock().unwrap().push((
            domain.to_string(),
            record_id.to_string(),
            new_ip.to_string(),
        ));

        if self.failing_domains.lock().unwrap().contains(domain) {
            return Err(Error::provider("mock", format!("update rejected: {domain}")));
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Shorthand for building a snapshot record
pub fn record(id: &str, name: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        name: name.to_string(),
        content: content.to_string(),
    }
}

/// Helper to create a minimal SyncConfig for testing
pub fn test_config(domains: &[&str]) -> SyncConfig {
    SyncConfig::new(
        "test-token",
        "test-zone",
        1,
        domains.iter().map(|d| d.to_string()),
    )
}

/// Drain every event currently buffered on the receiver
pub fn drain_events(rx: &mut mpsc::Receiver<ReconcilerEvent>) -> Vec<ReconcilerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
