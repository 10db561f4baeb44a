//! Identity-provider collaborator.
//!
//! SYSTEM CONTEXT
//! ==============
//! The redirect login, code exchange and token refresh happen outside this
//! crate. We only consume the provider's capabilities: build login/logout
//! URLs, hand out a bearer credential silently, and read user claims.

use reqwest::Url;
use uuid::Uuid;

use super::claims::UserClaims;
use crate::config::{AuthConfig, HttpTimeouts};

pub const LOGIN_SCOPE: &str = "openid profile email";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("not authenticated; please log in")]
    NotAuthenticated,
    #[error("login required to obtain a credential; please log in again")]
    LoginRequired,
    #[error("consent required to obtain a credential; please log in again")]
    ConsentRequired,
    #[error("identity provider returned an empty credential; please log in again")]
    EmptyCredential,
    #[error("identity provider error: {0}; please log in again")]
    Provider(String),
}

/// Parameters for a silent credential request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenRequest<'a> {
    /// Omitted from the provider call entirely when `None`.
    pub audience: Option<&'a str>,
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Obtain a bearer credential without user interaction.
    async fn credential(&self, request: &TokenRequest<'_>) -> Result<String, AuthError>;

    /// Read the claims of the user the credential belongs to.
    async fn user_claims(&self, credential: &str) -> Result<UserClaims, AuthError>;
}

// =============================================================================
// AUTH0
// =============================================================================

pub struct Auth0Provider {
    http: reqwest::Client,
    config: AuthConfig,
    userinfo_url: String,
}

impl Auth0Provider {
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] if the HTTP client cannot be built.
    pub fn new(config: AuthConfig, timeouts: HttpTimeouts) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        let userinfo_url = format!("{}/userinfo", tenant_base(&config.domain));
        Ok(Self { http, config, userinfo_url })
    }

    /// Build the redirect-login URL. Returns the URL and the `state` nonce the
    /// callback must echo back.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] if the domain does not form a valid URL.
    pub fn authorize_url(&self, redirect_uri: &str) -> Result<(Url, String), AuthError> {
        let state = Uuid::new_v4().simple().to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", LOGIN_SCOPE),
            ("state", state.as_str()),
        ];
        if let Some(audience) = self.config.audience.as_deref() {
            params.push(("audience", audience));
        }
        let url = Url::parse_with_params(&format!("{}/authorize", tenant_base(&self.config.domain)), &params)
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        Ok((url, state))
    }

    /// Build the provider logout URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] if the domain does not form a valid URL.
    pub fn logout_url(&self, return_to: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &format!("{}/v2/logout", tenant_base(&self.config.domain)),
            &[("client_id", self.config.client_id.as_str()), ("returnTo", return_to)],
        )
        .map_err(|e| AuthError::Provider(e.to_string()))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for Auth0Provider {
    async fn credential(&self, request: &TokenRequest<'_>) -> Result<String, AuthError> {
        // The externally obtained token was minted for the audience configured
        // at login; a different audience would need a new consent round.
        if request.audience != self.config.audience.as_deref() {
            return Err(AuthError::ConsentRequired);
        }
        self.config
            .access_token
            .clone()
            .ok_or(AuthError::LoginRequired)
    }

    async fn user_claims(&self, credential: &str) -> Result<UserClaims, AuthError> {
        let resp = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(credential)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::LoginRequired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Provider(format!("{status}: {body}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        parse_user_claims(&body)
    }
}

fn tenant_base(domain: &str) -> String {
    let domain = domain.trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

fn parse_user_claims(body: &str) -> Result<UserClaims, AuthError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| AuthError::Provider(format!("unexpected userinfo response: {body}")))?;
    if !value.is_object() {
        return Err(AuthError::Provider(format!("unexpected userinfo response: {body}")));
    }
    Ok(UserClaims::from(value))
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
