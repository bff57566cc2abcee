// # Cloudflare DNS Provider
//
// Implements `DnsProvider` against the Cloudflare v4 API.
//
// ## Operations
//
// - List A records: GET `/zones/:zone_id/dns_records`
// - Replace a record: PUT `/zones/:zone_id/dns_records/:record_id`
//
// Every response carries the `{success, result, errors}` envelope; a
// `success: false` answer is surfaced as a provider error with the reported
// detail. One HTTP request per call, no retry, no caching: the reconciler
// owns scheduling and re-attempts on the next cycle.
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider fails fast at construction if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/

use async_trait::async_trait;
use dyndns_core::traits::{DnsProvider, DnsRecord};
use dyndns_core::{Error, Result, SyncConfig};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// HTTP timeout for API requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Response envelope shared by all Cloudflare API calls
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

/// Provider-reported error detail
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Wire form of a DNS record
#[derive(Debug, Deserialize)]
struct ApiRecord {
    id: String,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    content: String,
}

/// Cloudflare DNS provider
///
/// Stateless and single-shot: each call issues exactly one HTTP request and
/// returns the outcome to the reconciler.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone whose records are managed
    zone_id: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: token with Zone:DNS:Edit permission
    /// - `zone_id`: the zone whose A records are managed
    ///
    /// # Errors
    ///
    /// Fails if either value is empty; reconciliation is impossible without
    /// credentials, so this is caught before the loop starts.
    pub fn new(api_token: impl Into<String>, zone_id: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        let zone_id = zone_id.into();

        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }
        if zone_id.is_empty() {
            return Err(Error::config("Cloudflare zone ID cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_token,
            zone_id,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Create a provider from validated startup configuration
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        Self::new(config.api_token.clone(), config.zone_id.clone())
    }

    /// Override the API base URL (used by tests against a local server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, self.zone_id)
    }

    fn format_errors(errors: &[ApiError]) -> String {
        if errors.is_empty() {
            return "no error detail reported".to_string();
        }
        errors
            .iter()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Fetch all A records for the zone
    ///
    /// Non-A records are filtered out; the surviving records keep the
    /// server's response order.
    async fn fetch_a_records(&self) -> Result<Vec<DnsRecord>> {
        let response = self
            .client
            .get(self.records_url())
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::provider(
                "cloudflare",
                format!("record list failed: HTTP {}", response.status()),
            ));
        }

        let envelope: ApiEnvelope<Vec<ApiRecord>> = response
            .json()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("failed to parse response: {e}")))?;

        if !envelope.success {
            return Err(Error::provider(
                "cloudflare",
                format!("record list rejected: {}", Self::format_errors(&envelope.errors)),
            ));
        }

        let records: Vec<DnsRecord> = envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.record_type == "A")
            .map(|r| DnsRecord {
                id: r.id,
                name: r.name,
                content: r.content,
            })
            .collect();

        debug!(zone = %self.zone_id, count = records.len(), "fetched A records");
        Ok(records)
    }

    /// Replace a record's content with a new IPv4 address
    ///
    /// Sends a full replacement body. TTL 1 means "automatic" and proxying
    /// is always forced off; dynamic records must expose the origin address
    /// directly, so this is a fixed policy rather than configuration.
    async fn update_record(&self, domain: &str, record_id: &str, new_ip: &str) -> Result<()> {
        let body = serde_json::json!({
            "type": "A",
            "name": domain,
            "content": new_ip,
            "ttl": 1,
            "proxied": false,
        });

        let response = self
            .client
            .put(format!("{}/{}", self.records_url(), record_id))
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::provider(
                "cloudflare",
                format!("record update failed: HTTP {}", response.status()),
            ));
        }

        let envelope: ApiEnvelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("failed to parse response: {e}")))?;

        if !envelope.success {
            return Err(Error::provider(
                "cloudflare",
                format!(
                    "update rejected for {}: {}",
                    domain,
                    Self::format_errors(&envelope.errors)
                ),
            ));
        }

        info!(domain, ip = %new_ip, "DNS record updated");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
