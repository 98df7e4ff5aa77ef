use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::CONFIG;
use crate::data_models::Message;

/// The provider rejects `max_results` outside this window.
const PROVIDER_MIN_RESULTS: u32 = 10;
const PROVIDER_MAX_RESULTS: u32 = 100;
const RECENT_SEARCH_PATH: &str = "/2/tweets/search/recent";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("search provider answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where the pipeline gets its messages from. `keywords` is already space
/// joined, `limit` caps the number of messages returned.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch(&self, keywords: &str, limit: u32) -> Result<Vec<Message>, FetchError>;
}

/// Recent-search endpoint of the Twitter v2 API.
pub struct TwitterSource {
    client: reqwest::Client,
    api_url: String,
    bearer_token: String,
}

impl TwitterSource {
    pub fn new(api_url: impl Into<String>, bearer_token: impl Into<String>) -> TwitterSource {
        TwitterSource {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        }
    }

    pub fn from_config() -> TwitterSource {
        Self::new(&CONFIG.twitter_api_url, &CONFIG.twitter_bearer_token)
    }
}

#[async_trait]
impl MessageSource for TwitterSource {
    async fn fetch(&self, keywords: &str, limit: u32) -> Result<Vec<Message>, FetchError> {
        let max_results = limit.clamp(PROVIDER_MIN_RESULTS, PROVIDER_MAX_RESULTS);
        tracing::debug!(keywords, limit, max_results, "searching recent tweets");

        let res = self
            .client
            .get(format!("{}{}", self.api_url, RECENT_SEARCH_PATH))
            .bearer_auth(&self.bearer_token)
            .query(&[("query", keywords.to_string()), ("max_results", max_results.to_string())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        decode_search_page(&body, limit)
    }
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    data: Vec<Value>,
}

/// Pulls the messages out of a search response body, keeping at most
/// `limit` of them. A page with no `data` field is an empty result.
pub fn decode_search_page(body: &str, limit: u32) -> Result<Vec<Message>, FetchError> {
    let page: SearchPage = serde_json::from_str(body)?;
    Ok(page
        .data
        .into_iter()
        .take(limit as usize)
        .map(Message::new)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Query, State},
        http::{HeaderMap, StatusCode as HttpStatus},
        routing::get,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SeenRequests {
        requests: Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>,
    }

    /// Stand-in for the recent-search endpoint: always answers with
    /// `max_results` tweets, or 401 unless the token is "secret".
    async fn recent_search(
        State(seen): State<SeenRequests>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, (HttpStatus, String)> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.requests.lock().unwrap().push((params.clone(), auth.clone()));

        if auth.as_deref() != Some("Bearer secret") {
            return Err((HttpStatus::UNAUTHORIZED, "Unauthorized".to_string()));
        }
        let n: usize = params["max_results"].parse().unwrap();
        let data: Vec<Value> = (0..n).map(|i| json!({ "id": i.to_string() })).collect();
        Ok(Json(json!({ "data": data, "meta": { "result_count": n } })))
    }

    async fn spawn_provider() -> (String, SeenRequests) {
        let seen = SeenRequests::default();
        let app = Router::new()
            .route(RECENT_SEARCH_PATH, get(recent_search))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}/"), seen)
    }

    #[tokio::test]
    async fn test_fetch_clamps_window_and_truncates() {
        let (url, seen) = spawn_provider().await;
        let source = TwitterSource::new(url, "secret");

        let small = source.fetch("din djarin", 5).await.unwrap();
        assert_eq!(small.len(), 5);

        let large = source.fetch("grogu", 500).await.unwrap();
        assert_eq!(large.len(), 100);

        let requests = seen.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0["query"], "din djarin");
        assert_eq!(requests[0].0["max_results"], "10");
        assert_eq!(requests[0].1.as_deref(), Some("Bearer secret"));
        assert_eq!(requests[1].0["max_results"], "100");
    }

    #[tokio::test]
    async fn test_fetch_rejected_is_status_error() {
        let (url, seen) = spawn_provider().await;
        let source = TwitterSource::new(url, "wrong");

        let err = source.fetch("rust", 5).await.unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(seen.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_decode_truncates_to_limit() {
        let body = json!({
            "data": (0..12).map(|i| json!({"id": i.to_string(), "text": format!("t{i}")})).collect::<Vec<_>>(),
            "meta": {"result_count": 12}
        })
        .to_string();

        let msgs = decode_search_page(&body, 5).unwrap();
        assert_eq!(msgs.len(), 5);
        assert_eq!(msgs[0].payload()["id"], "0");
        assert_eq!(msgs[4].payload()["text"], "t4");
    }

    #[test]
    fn test_decode_without_data_is_empty() {
        let msgs = decode_search_page(r#"{"meta":{"result_count":0}}"#, 5).unwrap();
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_decode_garbage_is_error() {
        let err = decode_search_page("<html>", 5).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
