// # DNS Provider Trait
//
// Defines the interface for reading and updating DNS records via a provider
// REST API.
//
// ## Implementations
//
// - Cloudflare: `dyndns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::DnsProvider;
//
// let provider = /* DnsProvider implementation */;
//
// let records = provider.fetch_a_records().await?;
// for record in &records {
//     provider.update_record(&record.name, &record.id, "203.0.113.7").await?;
// }
// ```

use async_trait::async_trait;

/// A provider-side "A" record snapshot
///
/// Fetched fresh every cycle and discarded afterwards. The record is owned
/// entirely by the provider; this system only reads it and requests
/// mutations through [`DnsProvider::update_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Opaque provider-assigned record identifier
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Current IPv4 address the record points at
    pub content: String,
}

/// Trait for DNS provider implementations
///
/// Implementations must handle the specifics of each provider's API.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Forbidden Capabilities
///
/// Providers are isolated, stateless, single-shot collaborators:
/// - No retry or backoff logic (the next cycle re-attempts naturally)
/// - No caching of record state between calls (owned by the cycle snapshot)
/// - No background tasks
/// - No decisions about whether an update is needed (owned by `Reconciler`)
///
/// If providers retried internally, the loop could not bound how long a
/// cycle runs and failed updates would be re-attempted on two schedules at
/// once.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch all "A" records for the configured zone
    ///
    /// Records are returned in server order; callers that need a name lookup
    /// build it themselves so duplicate-name handling stays in one place.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: the zone's A records (possibly empty)
    /// - `Err(Error)`: record state could not be determined this cycle:
    ///   transport failure, parse failure, or a provider-reported error.
    ///   Callers must treat this as "unknown state", not "zero records".
    async fn fetch_a_records(&self) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Point an existing record at a new IPv4 address
    ///
    /// Issues a full record replacement. Implementations log the outcome;
    /// callers do not retry within the same cycle.
    ///
    /// # Parameters
    ///
    /// - `domain`: the record name (e.g. "home.example.com")
    /// - `record_id`: provider identifier from a fetched [`DnsRecord`]
    /// - `new_ip`: dotted-quad IPv4 address to write
    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        new_ip: &str,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
