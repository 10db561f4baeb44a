//! Debug-only peek at bearer token payloads.
//!
//! UNTRUSTED: the payload is base64-decoded without any signature check.
//! Nothing here may feed an authorization decision; it exists so a developer
//! can see which issuer/audience a credential was minted for when the backend
//! rejects it.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Unverified subset of JWT registered claims.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UntrustedTokenSummary {
    pub iss: Option<String>,
    pub aud: Option<serde_json::Value>,
    pub sub: Option<String>,
    pub exp: Option<i64>,
    pub scope: Option<String>,
}

impl UntrustedTokenSummary {
    /// Expiry as RFC 3339, if present and representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<String> {
        let exp = OffsetDateTime::from_unix_timestamp(self.exp?).ok()?;
        exp.format(&Rfc3339).ok()
    }
}

/// Decode the payload segment of a compact JWS. `None` for opaque tokens.
#[must_use]
pub fn peek_untrusted(token: &str) -> Option<UntrustedTokenSummary> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// First few characters of a credential, safe to put in logs.
#[must_use]
pub fn token_prefix(token: &str) -> String {
    let prefix: String = token.chars().take(12).collect();
    format!("{prefix}...")
}

/// Log the unverified token summary at debug level.
pub fn log_token_summary(token: &str) {
    match peek_untrusted(token) {
        Some(summary) => tracing::debug!(
            untrusted = true,
            token = %token_prefix(token),
            iss = ?summary.iss,
            aud = ?summary.aud,
            sub = ?summary.sub,
            expires_at = ?summary.expires_at(),
            scope = ?summary.scope,
            "acquired credential (unverified payload)"
        ),
        None => tracing::debug!(token = %token_prefix(token), "acquired opaque credential"),
    }
}

#[cfg(test)]
#[path = "diagnostics_test.rs"]
mod tests;
