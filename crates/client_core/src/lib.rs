use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    domain::{Post, PostId, User},
    protocol::CreatePostRequest,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod identity;
pub mod ordering;
pub mod session;
pub mod store;

pub use error::{SyncError, TransportError};
pub use store::{HttpPostStore, RemotePostStore};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load posts.";
pub const MISSING_FIELDS_MESSAGE: &str = "Both a title and text are required.";
pub const POST_CREATED_MESSAGE: &str = "Post created.";
pub const POST_DELETED_MESSAGE: &str = "Post deleted.";

const EVENT_CAPACITY: usize = 64;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Unsubmitted post input held by the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }

    /// Trimmed title and text, or a validation error if either is blank.
    fn validated(&self) -> Result<(String, String), SyncError> {
        let title = self.title.trim();
        let text = self.text.trim();
        if title.is_empty() || text.is_empty() {
            return Err(SyncError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }
        Ok((title.to_string(), text.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    pub posts: Vec<Post>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    pub draft: PostDraft,
}

#[derive(Debug, Clone)]
pub enum SyncEvent {
    StateChanged(SyncState),
}

/// Keeps a user's post list in step with a [`RemotePostStore`].
///
/// Every mutating command ends by re-listing the store, so `posts` always
/// reflects the store's view after the command rather than the local guess
/// made while it was in flight. Commands on one controller run one at a time.
pub struct SyncController {
    store: Arc<dyn RemotePostStore>,
    clock: Arc<dyn Clock>,
    commands: Mutex<()>,
    state: Mutex<SyncState>,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncController {
    pub fn new(store: Arc<dyn RemotePostStore>) -> Arc<Self> {
        Self::new_with_clock(store, Arc::new(SystemClock))
    }

    pub fn new_with_clock(store: Arc<dyn RemotePostStore>, clock: Arc<dyn Clock>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            store,
            clock,
            commands: Mutex::new(()),
            state: Mutex::new(SyncState::default()),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> SyncState {
        self.state.lock().await.clone()
    }

    /// Loads `user`'s posts from scratch. Transport failures leave an empty
    /// list and a load error in the state; only a blank identity is an `Err`.
    pub async fn initialize(&self, user: &User) -> Result<SyncState, SyncError> {
        if user.id.is_blank() {
            return Err(SyncError::Precondition("user id is blank".to_string()));
        }

        let _command = self.commands.lock().await;
        self.update(|state| {
            state.is_loading = true;
            state.error = None;
            state.success = None;
        })
        .await;

        self.relist(user).await;
        Ok(self.update(|state| state.is_loading = false).await)
    }

    /// Drops everything held for the current user.
    pub async fn reset(&self) -> SyncState {
        let _command = self.commands.lock().await;
        self.update(|state| *state = SyncState::default()).await
    }

    /// Submits `draft`. The draft stays in `state.draft` while it is invalid
    /// or in flight and is cleared once the store round trip completes.
    pub async fn create_post(&self, user: &User, draft: PostDraft) -> SyncState {
        let _command = self.commands.lock().await;

        let (title, text) = match draft.validated() {
            Ok(fields) => fields,
            Err(err) => {
                let message = err.to_string();
                return self
                    .update(|state| {
                        state.draft = draft;
                        state.error = Some(message);
                        state.success = None;
                    })
                    .await;
            }
        };

        self.update(|state| {
            state.draft = draft;
            state.is_loading = true;
            state.error = None;
            state.success = None;
        })
        .await;

        let request = CreatePostRequest {
            user_id: user.id.clone(),
            title,
            text,
            posted_at: self.clock.now(),
        };
        match self.store.create_post(&request).await {
            Ok(post) => {
                info!(user_id = %user.id, post_id = %post.id, "post created");
                self.update(|state| {
                    state.posts.insert(0, post);
                    state.success = Some(POST_CREATED_MESSAGE.to_string());
                })
                .await;
            }
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "post create failed");
            }
        }

        self.relist(user).await;
        self.update(|state| {
            state.is_loading = false;
            state.draft = PostDraft::default();
        })
        .await
    }

    /// Deletes `post_id`. Only posts already listed for `user` are offered
    /// for deletion, so no ownership check happens here.
    pub async fn delete_post(&self, user: &User, post_id: &PostId) -> SyncState {
        let _command = self.commands.lock().await;
        self.update(|state| {
            state.is_loading = true;
            state.error = None;
            state.success = None;
        })
        .await;

        match self.store.delete_post(post_id).await {
            Ok(()) => {
                info!(user_id = %user.id, %post_id, "post deleted");
                self.update(|state| {
                    state.posts.retain(|post| &post.id != post_id);
                    state.success = Some(POST_DELETED_MESSAGE.to_string());
                })
                .await;
            }
            Err(err) => {
                warn!(user_id = %user.id, %post_id, error = %err, "post delete failed");
            }
        }

        self.relist(user).await;
        self.update(|state| state.is_loading = false).await
    }

    /// Replaces `posts` with the store's current list for `user`.
    async fn relist(&self, user: &User) {
        match self.store.list_posts().await {
            Ok(all) => {
                let posts = ordering::reconcile(all, &user.id);
                info!(user_id = %user.id, count = posts.len(), "posts listed");
                self.update(|state| state.posts = posts).await;
            }
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "post list failed");
                self.update(|state| {
                    state.posts.clear();
                    state.success = None;
                    state.error = Some(LOAD_FAILED_MESSAGE.to_string());
                })
                .await;
            }
        }
    }

    async fn update(&self, apply: impl FnOnce(&mut SyncState)) -> SyncState {
        let snapshot = {
            let mut guard = self.state.lock().await;
            apply(&mut guard);
            guard.clone()
        };
        let _ = self.events.send(SyncEvent::StateChanged(snapshot.clone()));
        snapshot
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
