//! Access to the remote post collection.

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Post, PostId},
    protocol::CreatePostRequest,
};
use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// The durable post collection. Implementations report every non-success
/// outcome as a [`TransportError`]; callers decide what reaches the user.
#[async_trait]
pub trait RemotePostStore: Send + Sync {
    /// Every post in the store, for all users.
    async fn list_posts(&self) -> Result<Vec<Post>, TransportError>;
    async fn create_post(&self, request: &CreatePostRequest) -> Result<Post, TransportError>;
    async fn delete_post(&self, post_id: &PostId) -> Result<(), TransportError>;
}

pub struct HttpPostStore {
    http: Client,
    base_url: Url,
}

impl HttpPostStore {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl RemotePostStore for HttpPostStore {
    async fn list_posts(&self) -> Result<Vec<Post>, TransportError> {
        let url = endpoint(&self.base_url, &["posts"]);
        debug!(%url, "post store: list");
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| request_error("GET", &url, source))?;
        let res = ensure_success("GET", &url, res)?;
        res.json()
            .await
            .map_err(|source| request_error("GET", &url, source))
    }

    async fn create_post(&self, request: &CreatePostRequest) -> Result<Post, TransportError> {
        let url = endpoint(&self.base_url, &["posts"]);
        debug!(%url, user_id = %request.user_id, "post store: create");
        let res = self
            .http
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|source| request_error("POST", &url, source))?;
        let res = ensure_success("POST", &url, res)?;
        res.json()
            .await
            .map_err(|source| request_error("POST", &url, source))
    }

    async fn delete_post(&self, post_id: &PostId) -> Result<(), TransportError> {
        let url = endpoint(&self.base_url, &["posts", post_id.as_str()]);
        debug!(%url, "post store: delete");
        let res = self
            .http
            .delete(url.clone())
            .send()
            .await
            .map_err(|source| request_error("DELETE", &url, source))?;
        ensure_success("DELETE", &url, res)?;
        Ok(())
    }
}

/// Appends path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

pub(crate) fn request_error(
    method: &'static str,
    url: &Url,
    source: reqwest::Error,
) -> TransportError {
    TransportError::Request {
        method,
        url: url.to_string(),
        source,
    }
}

pub(crate) fn ensure_success(
    method: &'static str,
    url: &Url,
    res: Response,
) -> Result<Response, TransportError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    Err(TransportError::Status {
        method,
        url: url.to_string(),
        status: status.as_u16(),
    })
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
