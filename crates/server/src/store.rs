use std::{fs, path::Path, sync::Arc};

use anyhow::Context;
use shared::{
    domain::{Post, PostId, User},
    error::{ApiException, ErrorCode},
    protocol::{CreatePostRequest, StoreSnapshot},
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory post collection shared by all request handlers.
#[derive(Clone, Default)]
pub struct PostDatabase {
    inner: Arc<RwLock<StoreSnapshot>>,
}

impl PostDatabase {
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Reads a `{ "users": [...], "posts": [...] }` document.
    pub fn load_seed(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("seed file '{}' is not a valid store document", path.display()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn list_users(&self) -> Vec<User> {
        self.inner.read().await.users.clone()
    }

    pub async fn list_posts(&self) -> Vec<Post> {
        self.inner.read().await.posts.clone()
    }

    pub async fn create_post(&self, request: CreatePostRequest) -> Result<Post, ApiException> {
        if request.user_id.is_blank() {
            return Err(ApiException::new(ErrorCode::Validation, "userId is required"));
        }
        if request.title.trim().is_empty() {
            return Err(ApiException::new(ErrorCode::Validation, "title is required"));
        }
        if request.text.trim().is_empty() {
            return Err(ApiException::new(ErrorCode::Validation, "text is required"));
        }

        let post = Post {
            id: PostId::new(Uuid::new_v4().to_string()),
            user_id: request.user_id,
            title: request.title,
            text: request.text,
            posted_at: request.posted_at,
        };
        self.inner.write().await.posts.push(post.clone());
        Ok(post)
    }

    pub async fn delete_post(&self, post_id: &PostId) -> Result<Post, ApiException> {
        let mut guard = self.inner.write().await;
        let Some(index) = guard.posts.iter().position(|post| &post.id == post_id) else {
            return Err(ApiException::new(
                ErrorCode::NotFound,
                format!("post {post_id} not found"),
            ));
        };
        Ok(guard.posts.remove(index))
    }
}
