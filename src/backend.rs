use crate::models::{Comment, CommentsResponse, StatsResponse};
use reqwest::StatusCode;
use std::{collections::BTreeMap, env, fmt, time::Duration};

/// Client for the external survey backend. This crate only presents data;
/// the backend owns storage and the aggregate computation behind
/// `/api/stats` and `/api/comments`.
#[derive(Clone)]
pub struct Backend {
    client: reqwest::Client,
    base_url: String,
}

impl Backend {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn fetch_stats(&self) -> Result<StatsResponse, BackendError> {
        let response = self.client.get(self.url("/api/stats")).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn fetch_comments(&self) -> Result<Vec<Comment>, BackendError> {
        let response = self.client.get(self.url("/api/comments")).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }
        let body: CommentsResponse = response.json().await?;
        Ok(body.comments)
    }

    /// Forward one flattened form submission as JSON. Binary outcome: any
    /// non-2xx status or transport error is a failed attempt.
    pub async fn submit_survey(
        &self,
        answers: &BTreeMap<String, String>,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/api/encuesta"))
            .json(answers)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug)]
pub enum BackendError {
    Transport(reqwest::Error),
    Status(StatusCode),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "backend unreachable: {err}"),
            Self::Status(status) => write!(f, "backend answered {status}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

pub fn resolve_backend_url() -> String {
    env::var("BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
}

pub fn resolve_refresh_interval() -> Duration {
    let secs = env::var("REFRESH_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(60);
    Duration::from_secs(secs.max(1))
}
