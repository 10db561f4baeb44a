//! REST client for the `/filmes` resource.
//!
//! | Method | Path            | Success       |
//! |--------|-----------------|---------------|
//! | GET    | `/filmes`       | JSON array    |
//! | POST   | `/filmes`       | created JSON  |
//! | DELETE | `/filmes/{id}`  | 200 / 204     |
//!
//! Every call carries `Authorization: Bearer <credential>`. Status mapping
//! and body normalization live in pure functions so they can be tested
//! without a server.

use reqwest::{StatusCode, Url};

use crate::config::HttpTimeouts;
use crate::error::{FetchOp, FilmesError};
use crate::filme::{Filme, FilmeId, NewFilme};

#[async_trait::async_trait]
pub trait FilmesApi: Send + Sync {
    async fn list(&self, credential: &str) -> Result<Vec<Filme>, FilmesError>;
    async fn create(&self, credential: &str, payload: &NewFilme) -> Result<Filme, FilmesError>;
    async fn delete(&self, credential: &str, id: &FilmeId) -> Result<(), FilmesError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpFilmesApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFilmesApi {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api`.
    ///
    /// # Errors
    ///
    /// Returns [`FilmesError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, FilmesError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| FilmesError::Transport(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    fn collection_url(&self) -> String {
        format!("{}/filmes", self.base_url)
    }

    fn item_url(&self, id: &FilmeId) -> Result<Url, FilmesError> {
        item_url(&self.collection_url(), id)
    }

    async fn read_body(resp: reqwest::Response) -> Result<(StatusCode, String), FilmesError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| FilmesError::Transport(e.to_string()))?;
        tracing::debug!(status = status.as_u16(), "response received");
        Ok((status, body))
    }
}

#[async_trait::async_trait]
impl FilmesApi for HttpFilmesApi {
    async fn list(&self, credential: &str) -> Result<Vec<Filme>, FilmesError> {
        let url = self.collection_url();
        tracing::debug!(%url, "GET filmes");
        let resp = self
            .http
            .get(&url)
            .bearer_auth(credential)
            .send()
            .await
            .map_err(|e| FilmesError::Transport(e.to_string()))?;

        let (status, body) = Self::read_body(resp).await?;
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                body = %body,
                "list rejected; check token audience and backend auth configuration"
            );
        }
        check_status(FetchOp::Load, status, body).and_then(|body| decode_list(&body))
    }

    async fn create(&self, credential: &str, payload: &NewFilme) -> Result<Filme, FilmesError> {
        let url = self.collection_url();
        tracing::debug!(%url, "POST filmes");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(credential)
            .json(payload)
            .send()
            .await
            .map_err(|e| FilmesError::Transport(e.to_string()))?;

        let (status, body) = Self::read_body(resp).await?;
        check_status(FetchOp::Create, status, body).and_then(|body| decode_filme(&body))
    }

    async fn delete(&self, credential: &str, id: &FilmeId) -> Result<(), FilmesError> {
        let url = self.item_url(id)?;
        tracing::debug!(%url, "DELETE filme");
        let resp = self
            .http
            .delete(url)
            .bearer_auth(credential)
            .send()
            .await
            .map_err(|e| FilmesError::Transport(e.to_string()))?;

        let (status, body) = Self::read_body(resp).await?;
        check_delete_status(status, body)
    }
}

// =============================================================================
// STATUS + BODY HANDLING
// =============================================================================

fn item_url(collection: &str, id: &FilmeId) -> Result<Url, FilmesError> {
    let mut url = Url::parse(collection).map_err(|e| FilmesError::Transport(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| FilmesError::Transport(format!("not a base URL: {collection}")))?
        .push(&id.to_string());
    Ok(url)
}

/// Pass the body through on 2xx, otherwise produce a `Fetch` error.
fn check_status(op: FetchOp, status: StatusCode, body: String) -> Result<String, FilmesError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(FilmesError::Fetch { op, status: status.as_u16(), body })
    }
}

/// `403` is singled out so the user learns they lack the privilege.
fn check_delete_status(status: StatusCode, body: String) -> Result<(), FilmesError> {
    if status == StatusCode::FORBIDDEN {
        return Err(FilmesError::Permission);
    }
    check_status(FetchOp::Delete, status, body).map(|_| ())
}

/// Decode a list response. Any non-array JSON body counts as an empty list.
fn decode_list(body: &str) -> Result<Vec<Filme>, FilmesError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| FilmesError::Decode(e.to_string()))?;
    if !value.is_array() {
        tracing::warn!("list response was not an array; treating as empty");
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|e| FilmesError::Decode(e.to_string()))
}

fn decode_filme(body: &str) -> Result<Filme, FilmesError> {
    serde_json::from_str(body).map_err(|e| FilmesError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
