//! Core reconciliation loop
//!
//! The Reconciler is responsible for:
//! - Resolving the current public IPv4 address via IpResolver
//! - Fetching the zone's A-record snapshot via DnsProvider
//! - Diffing desired domains against the snapshot
//! - Issuing minimal corrective updates
//! - Sleeping the configured interval and repeating forever
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐                          ┌──────────────┐
//! │ IpResolver  │── current IP ──────────▶ │  Reconciler  │
//! └─────────────┘                          └──────────────┘
//!                                             │        │
//!                        fetch / update       │        │ events
//!                                             ▼        ▼
//!                                    ┌──────────────┐ ┌──────────┐
//!                                    │ DnsProvider  │ │ Channel  │
//!                                    └──────────────┘ └──────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Resolve IP; on failure skip straight to the sleep
//! 2. Fetch the A-record snapshot; on failure skip to the sleep
//! 3. Build a name → record lookup (last record wins on duplicate names)
//! 4. Per desired domain: missing → log only; equal → no-op; differs → update
//! 5. Sleep the interval unconditionally, then start the next cycle
//!
//! All decisions within a cycle use the one resolved IP and the one fetched
//! snapshot; nothing is re-fetched mid-cycle and nothing survives the cycle.

use crate::config::SyncConfig;
use crate::error::Result;
use crate::traits::{DnsProvider, DnsRecord, IpResolver};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Capacity of the event channel handed out by [`Reconciler::new`]
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Scheduler seam for the inter-cycle pause
///
/// The sleep between cycles is the only designed suspension point in the
/// loop. Hiding it behind a trait lets tests substitute a fake that counts
/// calls or advances simulated time instead of really sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the loop for one check interval
    async fn sleep(&self, interval: Duration);
}

/// Production sleeper backed by `tokio::time::sleep`
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

/// Events emitted by the Reconciler
///
/// Emitted best-effort on a bounded channel for external monitoring; the
/// loop itself never blocks on the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilerEvent {
    /// Loop started
    Started {
        domain_count: usize,
    },

    /// Public IP resolved for this cycle
    IpResolved {
        ip: String,
    },

    /// Every lookup service failed; cycle skipped
    IpLookupFailed,

    /// Record snapshot could not be fetched; cycle skipped
    FetchFailed {
        error: String,
    },

    /// Desired domain has no matching A record (update-only policy)
    RecordMissing {
        domain: String,
    },

    /// Record already points at the current IP (converged no-op)
    Unchanged {
        domain: String,
        current_ip: String,
    },

    /// Record updated to the current IP
    Updated {
        domain: String,
        previous_ip: String,
        new_ip: String,
    },

    /// Update was attempted and failed; next cycle re-attempts
    UpdateFailed {
        domain: String,
        error: String,
    },

    /// Loop stopped
    Stopped {
        reason: String,
    },
}

/// Core reconciliation loop
///
/// Drives the resolver and provider strictly sequentially: one cycle runs to
/// completion, including all per-domain updates issued one at a time in
/// desired-domain order, before the next begins. There is no shared mutable
/// state across cycles besides the immutable startup configuration.
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Start with [`Reconciler::run()`]
/// 3. Loop runs until SIGINT (or a test shutdown signal) is received
pub struct Reconciler {
    /// Resolver for the current public IP
    resolver: Box<dyn IpResolver>,

    /// DNS provider for fetching and updating records
    provider: Box<dyn DnsProvider>,

    /// Desired domains, deduplicated, in stable update order
    domains: Vec<String>,

    /// Pause between cycles
    interval: Duration,

    /// Scheduler seam (real sleep in production)
    sleeper: Box<dyn Sleeper>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ReconcilerEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `resolver`: public IP resolver implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: validated startup configuration
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields
    /// [`ReconcilerEvent`]s as cycles progress
    pub fn new(
        resolver: Box<dyn IpResolver>,
        provider: Box<dyn DnsProvider>,
        config: &SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcilerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let reconciler = Self {
            resolver,
            provider,
            domains: config.domains.clone(),
            interval: Duration::from_secs(config.check_interval_secs),
            sleeper: Box::new(TokioSleeper),
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// Replace the sleeper (used by tests to avoid real sleeping)
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Run the loop until SIGINT
    ///
    /// There is no terminal state: only process termination stops the loop.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Test-only helper to run the loop with a controlled shutdown signal
    ///
    /// **TESTING ONLY**: integration tests need deterministic shutdown.
    /// Production code should use `run()`, which stops on OS signals.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(ReconcilerEvent::Started {
            domain_count: self.domains.len(),
        });
        info!(
            domains = self.domains.len(),
            interval_secs = self.interval.as_secs(),
            "reconciliation loop started"
        );

        if let Some(mut rx) = shutdown_rx {
            // Test mode: stop on the provided shutdown signal
            loop {
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "reconciliation cycle failed unexpectedly");
                }

                // The sleep is unconditional: a failed cycle waits the same
                // interval as a successful one.
                tokio::select! {
                    _ = self.sleeper.sleep(self.interval) => {}
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        self.emit_event(ReconcilerEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            // Production mode: stop on SIGINT or SIGTERM
            loop {
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "reconciliation cycle failed unexpectedly");
                }

                tokio::select! {
                    _ = self.sleeper.sleep(self.interval) => {}
                    _ = shutdown_signal() => {
                        info!("shutdown signal received");
                        self.emit_event(ReconcilerEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Run one reconciliation cycle
    ///
    /// Public so embedders and tests can drive single cycles without the
    /// loop. Every known failure mode is handled inside the cycle; an `Err`
    /// from this method is unexpected and is logged at the loop boundary
    /// without stopping the loop.
    pub async fn run_once(&self) -> Result<()> {
        let current_ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!(error = %e, "could not resolve public IP, skipping cycle");
                self.emit_event(ReconcilerEvent::IpLookupFailed);
                return Ok(());
            }
        };

        debug!(ip = %current_ip, "resolved public IP");
        self.emit_event(ReconcilerEvent::IpResolved {
            ip: current_ip.clone(),
        });

        let records = match self.provider.fetch_a_records().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    provider = self.provider.provider_name(),
                    error = %e,
                    "could not fetch record snapshot, skipping cycle"
                );
                self.emit_event(ReconcilerEvent::FetchFailed {
                    error: e.to_string(),
                });
                return Ok(());
            }
        };

        // Name lookup over the snapshot. When the provider returns duplicate
        // names, insertion order makes the last fetched record win.
        let by_name: HashMap<&str, &DnsRecord> =
            records.iter().map(|r| (r.name.as_str(), r)).collect();

        for domain in &self.domains {
            self.reconcile_domain(domain, by_name.get(domain.as_str()).copied(), &current_ip)
                .await;
        }

        Ok(())
    }

    /// Reconcile a single desired domain against the cycle snapshot
    ///
    /// A failure here is isolated: the remaining domains in the cycle are
    /// still reconciled.
    async fn reconcile_domain(&self, domain: &str, record: Option<&DnsRecord>, current_ip: &str) {
        let Some(record) = record else {
            warn!(domain, "no matching A record found, skipping (update-only)");
            self.emit_event(ReconcilerEvent::RecordMissing {
                domain: domain.to_string(),
            });
            return;
        };

        if record.content == current_ip {
            info!(domain, ip = %current_ip, "record already up to date");
            self.emit_event(ReconcilerEvent::Unchanged {
                domain: domain.to_string(),
                current_ip: current_ip.to_string(),
            });
            return;
        }

        info!(
            domain,
            previous_ip = %record.content,
            new_ip = %current_ip,
            "IP change detected"
        );

        match self
            .provider
            .update_record(domain, &record.id, current_ip)
            .await
        {
            Ok(()) => {
                self.emit_event(ReconcilerEvent::Updated {
                    domain: domain.to_string(),
                    previous_ip: record.content.clone(),
                    new_ip: current_ip.to_string(),
                });
            }
            Err(e) => {
                error!(domain, error = %e, "record update failed");
                self.emit_event(ReconcilerEvent::UpdateFailed {
                    domain: domain.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    /// Emit a reconciler event
    fn emit_event(&self, event: ReconcilerEvent) {
        // Best effort: a full channel means the consumer is slower than the
        // loop; the event is dropped rather than blocking a cycle.
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping event");
        }
    }
}

/// Wait for a shutdown signal (SIGINT or, on Unix, SIGTERM)
///
/// Both signals take the clean-shutdown path; systemd stops services with
/// SIGTERM, interactive runs with ctrl-c.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "could not install SIGTERM handler, falling back to SIGINT only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

/// Wait for a shutdown signal (SIGINT only on non-Unix platforms)
#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
