//! Error taxonomy surfaced to the user.
//!
//! ERROR HANDLING
//! ==============
//! Every variant renders as a single human-readable message for the error
//! banner. None of them is fatal: the user can retry the triggering action.

pub use crate::session::provider::AuthError;

/// Which record-store action a failed HTTP exchange belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOp {
    Load,
    Create,
    Delete,
}

impl std::fmt::Display for FetchOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Load => "load filmes",
            Self::Create => "create filme",
            Self::Delete => "delete filme",
        })
    }
}

/// Client-side input rejected before any network call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("nota must be a number between 0 and 5 (got {0:?})")]
    NotaNotNumeric(String),
    #[error("nota must be a number between 0 and 5 (got {0})")]
    NotaOutOfRange(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum FilmesError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend answered with a non-success status.
    #[error("failed to {op}: HTTP {status}{}", body_suffix(.body))]
    Fetch { op: FetchOp, status: u16, body: String },

    /// `403` on delete.
    #[error("you do not have permission to delete filmes")]
    Permission,

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// A success response whose body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl FilmesError {
    /// HTTP status carried by the error, if the backend produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => Some(*status),
            Self::Permission => Some(403),
            _ => None,
        }
    }
}

fn body_suffix(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() { String::new() } else { format!(" {trimmed}") }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
