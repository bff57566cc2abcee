// # IP Resolver Trait
//
// Defines the interface for resolving the host's current public IPv4 address.
//
// ## Implementations
//
// - HTTP echo services with ordered fallback: `dyndns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::IpResolver;
//
// let resolver = /* IpResolver implementation */;
// match resolver.resolve().await {
//     Ok(ip) => println!("public IP: {ip}"),
//     Err(e) => println!("lookup failed: {e}"),
// }
// ```

use async_trait::async_trait;

/// Trait for public IP resolver implementations
///
/// The reconciler calls [`IpResolver::resolve`] exactly once per cycle; the
/// returned address is used for every decision in that cycle and discarded
/// afterwards.
///
/// # Failure Semantics
///
/// A failed lookup is never fatal. Implementations must exhaust whatever
/// fallbacks they have and return `Err` only when no address could be
/// determined; the reconciler then skips the rest of the cycle and retries
/// after the next sleep.
///
/// # Forbidden Capabilities
///
/// Resolvers are single-shot observers. They must not:
/// - Spawn tasks or poll in the background (scheduling is owned by `Reconciler`)
/// - Retry across cycles (each cycle issues its own lookup)
/// - Cache addresses between calls (state is rebuilt every cycle)
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: a dotted-quad IPv4 address as reported by a lookup
    ///   service
    /// - `Err(Error)`: no service could produce a valid address
    async fn resolve(&self) -> Result<String, crate::Error>;
}
