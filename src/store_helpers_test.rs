use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::json;

use super::*;
use crate::error::FetchOp;
use crate::filme::NewFilme;
use crate::session::claims::{RoleResolver, UserClaims};
use crate::session::provider::{AuthError, IdentityProvider, TokenRequest};

pub const TOKEN: &str = "test-token";

/// One recorded call against the mock backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List { credential: String },
    Create { credential: String, payload: NewFilme },
    Delete { credential: String, id: FilmeId },
}

/// Scripted backend. Empty queues answer: list `[]`, create HTTP 500,
/// delete success.
#[derive(Default)]
pub struct MockApi {
    pub list_responses: Mutex<VecDeque<Result<Vec<Filme>, FilmesError>>>,
    pub create_responses: Mutex<VecDeque<Result<Filme, FilmesError>>>,
    pub delete_responses: Mutex<VecDeque<Result<(), FilmesError>>>,
    pub calls: Mutex<Vec<ApiCall>>,
}

impl MockApi {
    pub fn push_list(&self, result: Result<Vec<Filme>, FilmesError>) {
        self.list_responses.lock().unwrap().push_back(result);
    }

    pub fn push_create(&self, result: Result<Filme, FilmesError>) {
        self.create_responses.lock().unwrap().push_back(result);
    }

    pub fn push_delete(&self, result: Result<(), FilmesError>) {
        self.delete_responses.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FilmesApi for MockApi {
    async fn list(&self, credential: &str) -> Result<Vec<Filme>, FilmesError> {
        self.calls
            .lock()
            .unwrap()
            .push(ApiCall::List { credential: credential.into() });
        self.list_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn create(&self, credential: &str, payload: &NewFilme) -> Result<Filme, FilmesError> {
        self.calls
            .lock()
            .unwrap()
            .push(ApiCall::Create { credential: credential.into(), payload: payload.clone() });
        self.create_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FilmesError::Fetch { op: FetchOp::Create, status: 500, body: String::new() }))
    }

    async fn delete(&self, credential: &str, id: &FilmeId) -> Result<(), FilmesError> {
        self.calls
            .lock()
            .unwrap()
            .push(ApiCall::Delete { credential: credential.into(), id: id.clone() });
        self.delete_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// Provider that always hands out [`TOKEN`], or a fixed error.
pub struct StaticProvider {
    pub result: Result<String, AuthError>,
}

#[async_trait::async_trait]
impl IdentityProvider for StaticProvider {
    async fn credential(&self, _request: &TokenRequest<'_>) -> Result<String, AuthError> {
        self.result.clone()
    }

    async fn user_claims(&self, _credential: &str) -> Result<UserClaims, AuthError> {
        Ok(UserClaims::from(json!({ "sub": "auth0|test", "name": "Test User" })))
    }
}

/// A record with deterministic fields derived from `id`.
#[must_use]
pub fn filme(id: i64) -> Filme {
    Filme {
        id: FilmeId::Num(id),
        nome: format!("Filme {id}"),
        descricao: format!("Descricao {id}"),
        nota: Some(4.0),
        diretor: format!("Diretor {id}"),
    }
}

#[must_use]
pub fn draft(nota: &str) -> FilmeDraft {
    FilmeDraft { nome: "Novo".into(), descricao: "Desc".into(), nota: nota.into(), diretor: "Dir".into() }
}

/// Session logged in with the given `roles` claim.
#[must_use]
pub fn logged_in_session(roles: &[&str]) -> Arc<SessionContext> {
    let session = SessionContext::new(
        Arc::new(StaticProvider { result: Ok(TOKEN.into()) }),
        None,
        RoleResolver::default(),
    );
    session.establish(UserClaims::from(json!({ "sub": "auth0|test", "name": "Test User", "roles": roles })));
    Arc::new(session)
}

/// Session whose provider cannot issue credentials.
#[must_use]
pub fn session_without_credential(err: AuthError) -> Arc<SessionContext> {
    let session = SessionContext::new(Arc::new(StaticProvider { result: Err(err) }), None, RoleResolver::default());
    session.establish(UserClaims::from(json!({ "sub": "auth0|test" })));
    Arc::new(session)
}

/// Store wired to a fresh mock backend and a logged-in session.
#[must_use]
pub fn test_store() -> (Arc<MockApi>, RecordStore) {
    let api = Arc::new(MockApi::default());
    let store = RecordStore::new(api.clone(), logged_in_session(&[]));
    (api, store)
}

/// Seed the store's list through a scripted successful fetch.
pub async fn seed(api: &MockApi, store: &RecordStore, items: Vec<Filme>) {
    api.push_list(Ok(items));
    store.list().await.unwrap();
}
