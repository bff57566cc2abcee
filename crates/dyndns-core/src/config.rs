//! Configuration for the dyndns synchronizer
//!
//! Configuration is read once at startup, validated, and never mutated for
//! the lifetime of the process. There are no global singletons; the config
//! value is passed into each component that needs it.

/// Immutable startup configuration
#[derive(Clone)]
pub struct SyncConfig {
    /// DNS provider API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Provider zone identifier
    pub zone_id: String,

    /// Seconds to sleep between reconciliation cycles
    pub check_interval_secs: u64,

    /// Domains whose A records are kept in sync (deduplicated)
    pub domains: Vec<String>,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("check_interval_secs", &self.check_interval_secs)
            .field("domains", &self.domains)
            .finish()
    }
}

impl SyncConfig {
    /// Create a new configuration
    ///
    /// Domains are trimmed and deduplicated, keeping the first occurrence.
    /// Ordering is otherwise preserved so updates run in a stable order.
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        check_interval_secs: u64,
        domains: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut seen = Vec::new();
        for domain in domains {
            let domain = domain.trim().to_string();
            if !domain.is_empty() && !seen.contains(&domain) {
                seen.push(domain);
            }
        }

        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            check_interval_secs,
            domains: seen,
        }
    }

    /// Validate the configuration
    ///
    /// Configuration errors are the only fatal error class: without a token,
    /// zone, interval, and at least one domain no reconciliation is possible.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }

        if self.zone_id.is_empty() {
            return Err(crate::Error::config("Zone ID cannot be empty"));
        }

        if self.check_interval_secs == 0 {
            return Err(crate::Error::config(
                "Check interval must be at least 1 second",
            ));
        }

        if self.domains.is_empty() {
            return Err(crate::Error::config("No domains configured"));
        }

        for domain in &self.domains {
            validate_domain_name(domain)?;
        }

        Ok(())
    }
}

/// Validate that a string is a valid domain name
///
/// Basic DNS name validation per RFC 1035. Not comprehensive, but catches
/// the common copy-paste mistakes before the first provider call.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253): {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63): '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen: '{}'",
                label
            )));
        }
    }

    Ok(())
}
