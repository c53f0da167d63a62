use std::time::Duration;

use serde::Deserialize;

use spotter_domain as domain;

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn get(&self, url: &str, query: &[(&str, String)])
    -> Result<Response, domain::StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestSendRequest {
    client: reqwest::Client,
}

impl ReqwestSendRequest {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

impl SendRequest for ReqwestSendRequest {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Response, domain::StorageError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(storage_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(storage_error)?;
        Ok(Response { status, body })
    }
}

fn storage_error(err: reqwest::Error) -> domain::StorageError {
    if err.is_connect() || err.is_timeout() {
        domain::StorageError::NoConnection
    } else {
        domain::StorageError::Other(Box::new(err))
    }
}

/// Client of the external exercise search index.
#[derive(Debug, Clone)]
pub struct REST<S: SendRequest> {
    base_url: String,
    sender: S,
}

impl REST<ReqwestSendRequest> {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_sender(base_url, ReqwestSendRequest::new(timeout)?))
    }
}

impl<S: SendRequest> REST<S> {
    pub fn with_sender(base_url: &str, sender: S) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            sender,
        }
    }
}

impl<S: SendRequest> domain::ExerciseSearchRepository for REST<S> {
    async fn search_exercises(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<domain::SearchHit>, domain::ReadError> {
        let response = self
            .sender
            .get(
                &format!("{}/exercises/search", self.base_url),
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        if !response.ok() {
            return Err(domain::ReadError::Other(
                format!("search failed with status {}", response.status).into(),
            ));
        }

        let hits = serde_json::from_str::<SearchResponse>(&response.body)
            .map_err(|err| domain::ReadError::Other(Box::new(err)))?;

        Ok(hits
            .results
            .into_iter()
            .take(limit)
            .map(|result| domain::SearchHit {
                id: result.id,
                name: result.name,
                score: result.score,
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    id: String,
    name: String,
    #[serde(default)]
    score: f32,
}
