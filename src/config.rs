//! Client configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_ROLES_CLAIM: &str = "https://insper.edu.br/roles";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: env var {var} not set")]
    Missing { var: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Identity-provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub domain: String,
    pub client_id: String,
    /// `None` when unset or blank; credential requests then omit the audience.
    pub audience: Option<String>,
    pub roles_claim: String,
    /// Bearer credential handed over by an external login, if any.
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub auth: AuthConfig,
    pub api_url: String,
    pub timeouts: HttpTimeouts,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `AUTH0_DOMAIN`
    /// - `AUTH0_CLIENT_ID`
    ///
    /// Optional:
    /// - `AUTH0_AUDIENCE`: omitted from token requests when absent
    /// - `FILMES_ROLES_CLAIM`: namespaced roles claim, default `https://insper.edu.br/roles`
    /// - `FILMES_ACCESS_TOKEN`: bearer credential from an external login
    /// - `FILMES_API_URL`: default `http://localhost:8080/api`
    /// - `FILMES_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FILMES_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when a required variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when a required variable is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let domain = required(&lookup, "AUTH0_DOMAIN")?;
        let client_id = required(&lookup, "AUTH0_CLIENT_ID")?;
        let audience = non_blank(lookup("AUTH0_AUDIENCE"));
        let roles_claim = non_blank(lookup("FILMES_ROLES_CLAIM")).unwrap_or_else(|| DEFAULT_ROLES_CLAIM.to_string());
        let access_token = non_blank(lookup("FILMES_ACCESS_TOKEN"));

        let api_url = non_blank(lookup("FILMES_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = HttpTimeouts {
            request_secs: parse_u64(lookup("FILMES_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("FILMES_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { auth: AuthConfig { domain, client_id, audience, roles_claim, access_token }, api_url, timeouts })
    }
}

/// Log filter directive: `RUST_LOG` when set, otherwise `debug` for verbose
/// runs and `warn` for everything else.
#[must_use]
pub fn log_directive(verbose: bool, rust_log: Option<String>) -> String {
    non_blank(rust_log).unwrap_or_else(|| default_log_directive(verbose).to_string())
}

#[must_use]
pub const fn default_log_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup(var)).ok_or(ConfigError::Missing { var })
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
