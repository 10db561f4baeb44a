//! In-memory record list synchronized with the backend.
//!
//! DESIGN
//! ======
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`, so list/create/remove can be in flight at the same time. The
//! list is only touched after a fully successful response: replaced on list,
//! prepended on create, filtered on remove. Whichever response lands last
//! wins.
//!
//! No idempotency key is sent with creates; a caller that retries a failed
//! POST may create a duplicate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::FilmesApi;
use crate::error::FilmesError;
use crate::filme::{Filme, FilmeDraft, FilmeId};
use crate::session::SessionContext;

#[derive(Debug, Clone, Default)]
struct StoreState {
    items: Vec<Filme>,
    loading: bool,
}

pub struct RecordStore {
    api: Arc<dyn FilmesApi>,
    session: Arc<SessionContext>,
    state: Mutex<StoreState>,
}

impl RecordStore {
    #[must_use]
    pub fn new(api: Arc<dyn FilmesApi>, session: Arc<SessionContext>) -> Self {
        Self { api, session, state: Mutex::new(StoreState::default()) }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current list, newest creations first.
    #[must_use]
    pub fn items(&self) -> Vec<Filme> {
        self.state().items.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Drop all records (used on logout).
    pub fn clear(&self) {
        self.state().items.clear();
    }

    /// Fetch the collection and replace the in-memory list with it.
    ///
    /// # Errors
    ///
    /// Returns the credential or HTTP failure; the existing list is untouched.
    pub async fn list(&self) -> Result<Vec<Filme>, FilmesError> {
        self.state().loading = true;
        let result = self.fetch_all().await;
        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(items) => {
                tracing::info!(count = items.len(), "filmes loaded");
                state.items.clone_from(&items);
                Ok(items)
            }
            Err(e) => {
                tracing::warn!(error = %e, "loading filmes failed");
                Err(e)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Filme>, FilmesError> {
        let credential = self.session.credential().await?;
        self.api.list(&credential).await
    }

    /// Validate the draft, POST it, and prepend the created record.
    ///
    /// # Errors
    ///
    /// Returns [`FilmesError::Validation`] before any network call when
    /// `nota` is invalid, otherwise the credential or HTTP failure.
    pub async fn create(&self, draft: &FilmeDraft) -> Result<Filme, FilmesError> {
        let payload = draft.to_new_filme()?;
        let credential = self.session.credential().await?;
        let created = self.api.create(&credential, &payload).await.inspect_err(|e| {
            tracing::warn!(error = %e, "creating filme failed");
        })?;
        tracing::info!(id = %created.id, "filme created");
        self.state().items.insert(0, created.clone());
        Ok(created)
    }

    /// DELETE the record and drop it from the list.
    ///
    /// # Errors
    ///
    /// Returns [`FilmesError::Permission`] on `403`, otherwise the credential
    /// or HTTP failure.
    pub async fn remove(&self, id: &FilmeId) -> Result<(), FilmesError> {
        let credential = self.session.credential().await?;
        self.api.delete(&credential, id).await.inspect_err(|e| {
            tracing::warn!(%id, error = %e, "deleting filme failed");
        })?;
        tracing::info!(%id, "filme deleted");
        self.state().items.retain(|f| &f.id != id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
