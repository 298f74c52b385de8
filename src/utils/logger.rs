use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crate::models::security_log::{SecurityLogEntry, Severity};

const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt().with_env_filter(filter).init();
}

pub fn log_security_event(log: &SecurityLogEntry) {
    let username = log.username.as_deref().unwrap_or("-");
    let ip_address = log.ip_address.as_deref().unwrap_or("-");
    let detail = log.detail.as_deref().unwrap_or("");

    match log.severity {
        Severity::Info => info!(
            target: "security",
            username, ip_address, action = %log.action, detail, "security event"
        ),
        Severity::Warning => warn!(
            target: "security",
            username, ip_address, action = %log.action, detail, "security event"
        ),
    }
}
