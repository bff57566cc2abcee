// # dyndns-core
//
// Core library for the dyndns synchronizer.
//
// ## Architecture Overview
//
// This library provides the reconciliation loop that keeps a set of DNS "A"
// records pointed at the host's current public IPv4 address:
//
// - **IpResolver**: Trait for resolving the current public IP
// - **DnsProvider**: Trait for reading and updating provider-side records
// - **Reconciler**: Polling loop that drives resolve → fetch → diff → update
// - **Sleeper**: Scheduler seam so tests can replace the inter-cycle sleep
//
// ## Design Principles
//
// 1. **Separation of Concerns**: the loop owns all decisions; resolvers and
//    providers are stateless single-shot collaborators
// 2. **Failure Isolation**: per-service and per-domain failures never escape
//    their unit of work; only startup misconfiguration is fatal
// 3. **Fresh State**: record state is re-fetched from the provider every
//    cycle, never cached across cycles

pub mod config;
pub mod error;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use reconciler::{Reconciler, ReconcilerEvent, Sleeper, TokioSleeper};
pub use traits::{DnsProvider, DnsRecord, IpResolver};
