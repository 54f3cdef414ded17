//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Server and engine settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Path to the local lead database file.
    pub db_path: PathBuf,
    /// Optional catalog JSON override; the embedded catalog is used when
    /// unset.
    pub catalog_path: Option<PathBuf>,
    /// Sessions idle longer than this are pruned.
    pub session_idle_timeout: Duration,
    /// Upper bound on each outbound sink call at the terminal step.
    pub sink_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_or("LEAD_INTAKE_PORT", 8000),
            db_path: std::env::var("LEAD_INTAKE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/leads.db")),
            catalog_path: std::env::var("LEAD_INTAKE_CATALOG").ok().map(PathBuf::from),
            session_idle_timeout: Duration::from_secs(env_or(
                "LEAD_INTAKE_SESSION_IDLE_SECS",
                1800,
            )),
            sink_timeout: Duration::from_secs(env_or("LEAD_INTAKE_SINK_TIMEOUT_SECS", 10)),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            db_path: PathBuf::from("./data/leads.db"),
            catalog_path: None,
            session_idle_timeout: Duration::from_secs(1800),
            sink_timeout: Duration::from_secs(10),
        }
    }
}

/// SMTP settings for the notification emails.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Sender address for both emails.
    pub from_address: String,
    /// Operator address that receives the new-lead notification.
    pub operator_address: String,
}

impl SmtpConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SENDER_EMAIL` is not set (email sink disabled).
    pub fn from_env() -> Option<Self> {
        let from_address = std::env::var("SENDER_EMAIL").ok()?;

        let host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let port: u16 = env_or("SMTP_PORT", 587);
        let username = std::env::var("SMTP_USERNAME").unwrap_or_else(|_| from_address.clone());
        let password = SecretString::from(std::env::var("SENDER_PASSWORD").unwrap_or_default());
        let operator_address =
            std::env::var("RECEIVER_EMAIL").unwrap_or_else(|_| from_address.clone());

        Some(Self {
            host,
            port,
            username,
            password,
            from_address,
            operator_address,
        })
    }
}

/// CRM (HubSpot-style contacts API) settings.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    pub api_key: SecretString,
    pub base_url: String,
}

impl CrmConfig {
    /// Build config from environment variables.
    /// Returns `None` if `HUBSPOT_API_KEY` is not set (CRM sink disabled).
    pub fn from_env() -> Option<Self> {
        let api_key = SecretString::from(std::env::var("HUBSPOT_API_KEY").ok()?);
        let base_url = std::env::var("HUBSPOT_BASE_URL")
            .unwrap_or_else(|_| "https://api.hubapi.com".to_string());
        Some(Self { api_key, base_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.sink_timeout, Duration::from_secs(10));
        assert!(config.catalog_path.is_none());
    }
}
