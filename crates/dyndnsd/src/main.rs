// # dyndnsd - dynamic DNS daemon
//
// Thin integration layer: reads configuration from environment variables,
// initializes logging and the runtime, wires the resolver and provider into
// the reconciliation loop, and runs it until a shutdown signal. All
// reconciliation logic lives in dyndns-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `CLOUDFLARE_API_TOKEN`: API token with Zone:DNS:Edit permission (required)
// - `CLOUDFLARE_ZONE_ID`: zone whose A records are managed (required)
// - `CHECK_INTERVAL_S`: seconds between reconciliation cycles, >= 1 (required)
// - `CLOUDFLARE_DOMAINS`: whitespace-separated domain list (required)
// - `DYNDNS_LOG_LEVEL`: trace|debug|info|warn|error (default: info)
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=your_token
// export CLOUDFLARE_ZONE_ID=your_zone_id
// export CHECK_INTERVAL_S=300
// export CLOUDFLARE_DOMAINS="example.com www.example.com"
//
// dyndnsd
// ```

use anyhow::{Context, Result};
use dyndns_core::{Reconciler, SyncConfig};
use dyndns_ip_http::HttpIpResolver;
use dyndns_provider_cloudflare::CloudflareProvider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Load and validate configuration from environment variables
///
/// Misconfiguration is the one fatal error class: without credentials, zone,
/// interval, and domains no reconciliation is possible, so the daemon fails
/// fast here before anything else starts.
fn config_from_env() -> Result<SyncConfig> {
    let api_token = env::var("CLOUDFLARE_API_TOKEN")
        .context("CLOUDFLARE_API_TOKEN is required")?;
    let zone_id =
        env::var("CLOUDFLARE_ZONE_ID").context("CLOUDFLARE_ZONE_ID is required")?;
    let interval_raw =
        env::var("CHECK_INTERVAL_S").context("CHECK_INTERVAL_S is required")?;
    let domains_raw =
        env::var("CLOUDFLARE_DOMAINS").context("CLOUDFLARE_DOMAINS is required")?;

    let config = SyncConfig::new(
        api_token,
        zone_id,
        parse_interval(&interval_raw)?,
        split_domains(&domains_raw),
    );
    config.validate()?;

    Ok(config)
}

/// Parse the check interval, rejecting zero and non-numeric values
fn parse_interval(raw: &str) -> Result<u64> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("CHECK_INTERVAL_S must be an integer, got '{raw}'"))?;
    if secs == 0 {
        anyhow::bail!("CHECK_INTERVAL_S must be at least 1 second");
    }
    Ok(secs)
}

/// Split the whitespace-delimited domain list
fn split_domains(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(|s| s.to_string()).collect()
}

fn log_level_from_env() -> Level {
    match env::var("DYNDNS_LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> ExitCode {
    // Load and validate configuration before anything else
    let config = match config_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return DaemonExitCode::ConfigError.into();
        }
    };

    // Initialize tracing; events are written line-by-line with timestamps
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level_from_env())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DaemonExitCode::ConfigError.into();
    }

    info!(
        domains = config.domains.len(),
        interval_secs = config.check_interval_secs,
        "starting dyndnsd"
    );

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {e:#}");
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire up the components and run the reconciliation loop
async fn run_daemon(config: SyncConfig) -> Result<()> {
    let resolver = HttpIpResolver::new()?;
    let provider = CloudflareProvider::from_config(&config)?;

    let (reconciler, mut event_rx) =
        Reconciler::new(Box::new(resolver), Box::new(provider), &config)?;

    // Drain reconciler events so the channel never fills; the loop already
    // logs each notable event, so these only surface at debug level.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            tracing::debug!(?event, "reconciler event");
        }
    });

    for domain in &config.domains {
        info!(domain, "managing record");
    }

    reconciler.run().await?;
    info!("dyndnsd stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_parses_positive_integers() {
        assert_eq!(parse_interval("300").unwrap(), 300);
        assert_eq!(parse_interval(" 1 ").unwrap(), 1);
    }

    #[test]
    fn interval_rejects_zero_and_garbage() {
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("").is_err());
        assert!(parse_interval("five").is_err());
        assert!(parse_interval("-5").is_err());
    }

    #[test]
    fn domains_split_on_any_whitespace() {
        assert_eq!(
            split_domains("a.example.com   b.example.com\n\tc.example.com"),
            vec!["a.example.com", "b.example.com", "c.example.com"]
        );
        assert!(split_domains("   ").is_empty());
    }
}
