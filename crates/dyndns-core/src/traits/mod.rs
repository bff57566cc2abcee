//! Core traits for the dyndns synchronizer
//!
//! This module defines the abstract interfaces the reconciler drives each
//! cycle.
//!
//! - [`IpResolver`]: Resolve the current public IPv4 address
//! - [`DnsProvider`]: Read and update provider-side DNS records

pub mod dns_provider;
pub mod ip_resolver;

pub use dns_provider::{DnsProvider, DnsRecord};
pub use ip_resolver::IpResolver;
