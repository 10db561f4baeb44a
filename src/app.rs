//! Screen state for the filmes page.
//!
//! Mirrors what the page shows without rendering it: a login gate, the
//! profile header, the create form, a dismissible error banner, and the
//! record list. Every action clears the banner first and sets it on failure.

use std::sync::Arc;

use crate::filme::{Filme, FilmeDraft, FilmeId};
use crate::session::SessionContext;
use crate::session::claims::Identity;
use crate::store::RecordStore;

/// Which screen to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Login,
    Ready,
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined; no request was sent.
    Cancelled,
    /// The request failed; see [`FilmeApp::error`].
    Failed,
}

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this filme?";

pub struct FilmeApp {
    store: RecordStore,
    pub form: FilmeDraft,
    error: Option<String>,
}

impl FilmeApp {
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self { store, form: FilmeDraft::default(), error: None }
    }

    fn session(&self) -> &Arc<SessionContext> {
        self.store.session()
    }

    #[must_use]
    pub fn gate(&self) -> Gate {
        if self.session().is_authenticated() { Gate::Ready } else { Gate::Login }
    }

    #[must_use]
    pub fn profile(&self) -> Option<Identity> {
        self.session().current_identity()
    }

    /// Whether the delete action is offered. The backend still decides.
    #[must_use]
    pub fn can_delete(&self) -> bool {
        self.session().is_admin()
    }

    #[must_use]
    pub fn filmes(&self) -> Vec<Filme> {
        self.store.items()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Reload the list from the backend.
    pub async fn reload(&mut self) -> bool {
        self.error = None;
        match self.store.list().await {
            Ok(_) => true,
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// Submit the form; on success the form is cleared.
    pub async fn submit(&mut self) -> Option<Filme> {
        self.error = None;
        match self.store.create(&self.form).await {
            Ok(created) => {
                self.form.clear();
                Some(created)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Delete after the user confirms.
    pub async fn delete(&mut self, id: &FilmeId, confirm: &dyn Confirm) -> DeleteOutcome {
        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(%id, "delete cancelled by user");
            return DeleteOutcome::Cancelled;
        }
        self.error = None;
        match self.store.remove(id).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(e) => {
                self.error = Some(e.to_string());
                DeleteOutcome::Failed
            }
        }
    }

    /// End the session and reset every piece of screen state.
    pub async fn logout(&mut self) {
        self.session().end().await;
        self.store.clear();
        self.form.clear();
        self.error = None;
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
