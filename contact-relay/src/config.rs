//! Configuration module for the properties file and environment variables.
//!
//! Credentials come from `config.properties` when that file can be read, and
//! from the environment otherwise. Every other setting is looked up in the
//! file first, then the environment, then falls back to a default.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

/// Default properties file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.properties";

/// Environment variable that overrides the properties file location.
pub const CONFIG_FILE_VAR: &str = "CONTACT_CONFIG_FILE";

/// Key holding the sender account (also the SMTP username).
pub const SENDER_ADDRESS_KEY: &str = "GMAIL_USER";

/// Key holding the sender's app password.
pub const SENDER_SECRET_KEY: &str = "GMAIL_APP_PASSWORD";

/// Receiver used when nothing else is configured.
pub const PLACEHOLDER_RECEIVER: &str = "your mail";

/// Where the sender credentials were resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    File(PathBuf),
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::File(path) => write!(f, "file:{}", path.display()),
            CredentialSource::Environment => f.write_str("environment"),
        }
    }
}

/// Startup configuration errors. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "email credentials (GMAIL_USER or GMAIL_APP_PASSWORD) are missing; \
         checked {checked}. Fill in {file} or set the environment variables before running",
        file = .path.display()
    )]
    MissingCredentials { checked: CredentialSource, path: PathBuf },
}

/// Application configuration, built once at startup.
#[derive(Clone)]
pub struct Config {
    /// Sender mailbox and SMTP login
    pub sender_address: String,

    /// SMTP app password for the sender
    pub sender_secret: String,

    /// Fixed recipient of every contact message
    pub receiver_address: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// SMTP relay host (implicit TLS)
    pub smtp_host: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// Upper bound on a single SMTP exchange, in seconds
    pub smtp_timeout_secs: u64,

    /// Where the credentials were found
    pub source: CredentialSource,
}

// Hand-written so the secret never ends up in a log line.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sender_address", &self.sender_address)
            .field("sender_secret", &"<redacted>")
            .field("receiver_address", &self.receiver_address)
            .field("port", &self.port)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_timeout_secs", &self.smtp_timeout_secs)
            .field("source", &self.source)
            .finish()
    }
}

impl Config {
    /// Load configuration from the properties file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_FILE_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_from(&path, |key| env::var(key).ok())
    }

    /// Load configuration from `path`, using `lookup_env` for environment lookups.
    pub fn load_from<F>(path: &Path, lookup_env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match fs::read_to_string(path) {
            Ok(raw) => {
                info!(path = %path.display(), "config_file_loaded");
                Some(parse_properties(&raw))
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "config_file_unavailable_using_environment"
                );
                None
            }
        };

        // A readable file is authoritative for credentials.
        let (sender_address, sender_secret, source) = match &file {
            Some(props) => (
                props.get(SENDER_ADDRESS_KEY).cloned(),
                props.get(SENDER_SECRET_KEY).cloned(),
                CredentialSource::File(path.to_path_buf()),
            ),
            None => (
                lookup_env(SENDER_ADDRESS_KEY),
                lookup_env(SENDER_SECRET_KEY),
                CredentialSource::Environment,
            ),
        };

        let (sender_address, sender_secret) = match (sender_address, sender_secret) {
            (Some(user), Some(secret)) if !user.is_empty() && !secret.is_empty() => {
                (user, secret)
            }
            _ => {
                return Err(ConfigError::MissingCredentials {
                    checked: source,
                    path: path.to_path_buf(),
                })
            }
        };

        let lookup = |key: &str| -> Option<String> {
            file.as_ref()
                .and_then(|props| props.get(key).cloned())
                .or_else(|| lookup_env(key))
                .filter(|v| !v.trim().is_empty())
        };

        let receiver_address = lookup("CONTACT_RECEIVER").unwrap_or_else(|| {
            warn!(
                receiver = PLACEHOLDER_RECEIVER,
                "receiver_not_configured_using_placeholder"
            );
            PLACEHOLDER_RECEIVER.to_string()
        });

        Ok(Config {
            sender_address,
            sender_secret,
            receiver_address,
            port: parse_number("PORT", lookup("PORT"), 5000),
            smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            smtp_port: parse_number("SMTP_PORT", lookup("SMTP_PORT"), 465),
            smtp_timeout_secs: parse_number("SMTP_TIMEOUT_SECS", lookup("SMTP_TIMEOUT_SECS"), 10),
            source,
        })
    }
}

/// Parse a numeric setting, keeping the default on garbage.
fn parse_number<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr,
{
    let raw = match raw {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(setting = name, value = %raw, "Invalid number, using default");
            default
        }
    }
}

/// Parse a properties file into key/value pairs.
///
/// Accepts `key=value` and `key: value`. Blank lines and lines starting with
/// `#` or `!` are skipped. Later keys overwrite earlier ones.
fn parse_properties(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let idx = line.find(|c: char| c == '=' || c == ':')?;
            let key = line[..idx].trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), line[idx + 1..].trim().to_string()))
        })
        .collect()
}
