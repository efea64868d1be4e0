//! Display ordering for a user's posts.

use shared::domain::{Post, UserId};

/// Sorts posts newest first. Posts sharing a timestamp keep their input order.
pub fn order_posts(mut posts: Vec<Post>) -> Vec<Post> {
    // `sort_by` is stable, which is what keeps equal timestamps in place.
    posts.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
    posts
}

pub fn owned_by(posts: Vec<Post>, user_id: &UserId) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| post.is_owned_by(user_id))
        .collect()
}

/// The display list for `user_id` given everything the store returned.
pub fn reconcile(posts: Vec<Post>, user_id: &UserId) -> Vec<Post> {
    order_posts(owned_by(posts, user_id))
}
