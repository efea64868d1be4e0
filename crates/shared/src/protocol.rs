use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Post, User, UserId};

/// Body of `POST /posts`. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub user_id: UserId,
    pub title: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

/// Whole-store document, as used for seeding a post store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
}
