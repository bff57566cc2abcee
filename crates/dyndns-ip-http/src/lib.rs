// # HTTP Public IP Resolver
//
// Resolves the host's current public IPv4 address by asking a prioritized
// list of independently operated IP-echo services.
//
// ## Behavior
//
// Services are tried strictly in order. The first body that survives
// sanitization and looks like a dotted quad wins and no further services are
// contacted. A service that is unreachable, answers non-2xx, or returns an
// unusable body is logged and skipped. Only when every service has failed
// does `resolve()` return an error, which the reconciler treats as "skip
// this cycle".

use async_trait::async_trait;
use dyndns_core::{Error, IpResolver, Result};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Per-request timeout for the echo services
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default lookup services, in priority order
const DEFAULT_IP_SERVICES: &[&str] = &[
    "https://api64.ipify.org",
    "https://checkip.amazonaws.com",
    "https://ipv4.icanhazip.com",
    "https://ifconfig.me",
];

/// Public IP resolver with ordered service fallback
pub struct HttpIpResolver {
    /// Service URLs, tried in order
    services: Vec<String>,

    /// HTTP client (bounded timeout)
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver over the default service list
    pub fn new() -> Result<Self> {
        Self::with_services(DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()))
    }

    /// Create a resolver over a custom service list
    ///
    /// The order given is the order tried.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built; a client without the
    /// bounded timeout would let a stalled service hold up every cycle.
    pub fn with_services(services: impl IntoIterator<Item = String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            services: services.into_iter().collect(),
            client,
        })
    }

    /// Ask a single service for the public IP
    async fn fetch_from(&self, service: &str) -> Result<String> {
        let response = self
            .client
            .get(service)
            .send()
            .await
            .map_err(|e| Error::http(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::http(format!("HTTP error: {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("failed to read response: {e}")))?;

        let candidate = sanitize(&body);
        if is_dotted_quad(&candidate) {
            Ok(candidate)
        } else {
            Err(Error::ip_lookup(format!(
                "response is not an IPv4 address: '{}'",
                body.trim()
            )))
        }
    }
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<String> {
        for service in &self.services {
            match self.fetch_from(service).await {
                Ok(ip) => {
                    debug!(service, ip = %ip, "public IP resolved");
                    return Ok(ip);
                }
                Err(e) => {
                    warn!(service, error = %e, "lookup service failed, trying next");
                }
            }
        }

        error!("all IP lookup services failed");
        Err(Error::ip_lookup("all lookup services failed"))
    }
}

/// Strip whitespace and any markup around the address
///
/// Echo services answer plaintext, but some wrap the address in whitespace
/// or stray characters; everything except digits and dots is dropped.
fn sanitize(body: &str) -> String {
    body.trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Check for an IPv4-shaped dotted quad
///
/// Exactly four dot-separated groups of 1-3 digits. Octet range is
/// deliberately not checked; the services echo a real routable address.
fn is_dotted_quad(s: &str) -> bool {
    let mut groups = 0;
    for group in s.split('.') {
        groups += 1;
        if group.is_empty() || group.len() > 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }
    groups == 4
}
