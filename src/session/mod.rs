//! Session context: who is logged in, what they may do, and the bearer
//! credential attached to API calls.
//!
//! DESIGN
//! ======
//! A `SessionContext` is created unauthenticated, `establish`ed once the
//! login redirect completes, and `end`ed on logout. It is shared behind an
//! `Arc` and injected into the record store.
//!
//! The credential slot is a `tokio::sync::Mutex` held across the provider
//! call, so concurrent callers wait on one in-flight acquisition instead of
//! each asking the provider.

pub mod claims;
pub mod diagnostics;
pub mod provider;

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;

use claims::{Identity, RoleResolver, UserClaims, has_admin_role};
use provider::{AuthError, IdentityProvider, TokenRequest};

pub struct SessionContext {
    provider: Arc<dyn IdentityProvider>,
    audience: Option<String>,
    resolver: RoleResolver,
    user: RwLock<Option<UserClaims>>,
    credential: Mutex<Option<String>>,
}

impl SessionContext {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, audience: Option<String>, resolver: RoleResolver) -> Self {
        Self { provider, audience, resolver, user: RwLock::new(None), credential: Mutex::new(None) }
    }

    /// Mark the session authenticated with the given claims.
    pub fn establish(&self, claims: UserClaims) {
        let identity = claims.identity();
        tracing::info!(sub = ?identity.sub, email = ?identity.email, "session established");
        *self.user.write().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(claims);
    }

    /// Obtain a credential, read the user's claims with it, and establish the
    /// session. The credential stays cached for later API calls.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the provider cannot issue a credential or
    /// the claims lookup fails.
    pub async fn establish_from_provider(&self) -> Result<Identity, AuthError> {
        let token = self.acquire().await?;
        let claims = self.provider.user_claims(&token).await?;
        let identity = claims.identity();
        self.establish(claims);
        Ok(identity)
    }

    /// Tear down the session (logout): forget identity and credential.
    pub async fn end(&self) {
        *self.user.write().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        *self.credential.lock().await = None;
        tracing::info!("session ended");
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    #[must_use]
    pub fn current_identity(&self) -> Option<Identity> {
        self.user
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(UserClaims::identity)
    }

    /// Roles from the first claim source that yields any. Empty when logged out.
    #[must_use]
    pub fn roles(&self) -> BTreeSet<String> {
        self.user
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|claims| self.resolver.resolve(claims))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        has_admin_role(&self.roles())
    }

    /// Bearer credential for API calls, cached for the session's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] when logged out, or the
    /// provider's error when it cannot issue a credential silently.
    pub async fn credential(&self) -> Result<String, AuthError> {
        if !self.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        self.acquire().await
    }

    /// Drop the cached credential so the next use asks the provider again.
    pub async fn invalidate_credential(&self) {
        *self.credential.lock().await = None;
    }

    async fn acquire(&self) -> Result<String, AuthError> {
        let mut slot = self.credential.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        let request = TokenRequest { audience: self.audience.as_deref() };
        let token = self.provider.credential(&request).await.inspect_err(|e| {
            tracing::warn!(error = %e, "credential acquisition failed");
        })?;
        if token.is_empty() {
            return Err(AuthError::EmptyCredential);
        }

        diagnostics::log_token_summary(&token);
        *slot = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
