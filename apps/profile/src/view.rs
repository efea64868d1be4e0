//! Plain-text rendering of the profile screen.

use client_core::{PostDraft, SyncState};
use shared::domain::User;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

pub fn render(user: &User, state: &SyncState) -> String {
    let mut lines = vec![format!("{} <{}>", user.display_name(), user.email)];

    if state.is_loading {
        lines.push("loading...".to_string());
    }
    if let Some(error) = &state.error {
        lines.push(format!("error: {error}"));
    }
    if let Some(success) = &state.success {
        lines.push(format!("ok: {success}"));
    }
    if state.draft != PostDraft::default() {
        lines.push(format!(
            "draft: title={:?} text={:?}",
            state.draft.title, state.draft.text
        ));
    }

    lines.push(match state.posts.len() {
        0 => "No posts yet.".to_string(),
        1 => "1 post".to_string(),
        n => format!("{n} posts"),
    });
    for post in &state.posts {
        lines.push(format!(
            "[{}] {} (id: {})",
            post.posted_at.format(TIMESTAMP_FORMAT),
            post.title,
            post.id
        ));
        lines.extend(post.text.lines().map(|line| format!("    {line}")));
    }

    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use shared::domain::{Post, PostId, UserId};

    use super::*;

    fn ada() -> User {
        User {
            id: UserId::from("u1"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine".to_string(),
        }
    }

    #[test]
    fn renders_posts_in_state_order_with_messages() {
        let state = SyncState {
            posts: vec![
                Post {
                    id: PostId::from("p2"),
                    user_id: UserId::from("u1"),
                    title: "newer".to_string(),
                    text: "line one\nline two".to_string(),
                    posted_at: "2024-02-01T09:05:00Z".parse().expect("timestamp"),
                },
                Post {
                    id: PostId::from("p1"),
                    user_id: UserId::from("u1"),
                    title: "older".to_string(),
                    text: "hi".to_string(),
                    posted_at: "2024-01-01T00:00:00Z".parse().expect("timestamp"),
                },
            ],
            success: Some("Post created.".to_string()),
            ..SyncState::default()
        };

        let rendered = render(&ada(), &state);

        assert_eq!(
            rendered,
            "Ada Lovelace <ada@example.com>\n\
             ok: Post created.\n\
             2 posts\n\
             [2024-02-01 09:05 UTC] newer (id: p2)\n    line one\n    line two\n\
             [2024-01-01 00:00 UTC] older (id: p1)\n    hi\n"
        );
    }

    #[test]
    fn renders_load_failure_as_empty_profile() {
        let state = SyncState {
            error: Some("Failed to load posts.".to_string()),
            ..SyncState::default()
        };

        let rendered = render(&ada(), &state);

        assert!(rendered.contains("error: Failed to load posts."));
        assert!(rendered.ends_with("No posts yet.\n"));
    }

    #[test]
    fn renders_rejected_draft_for_correction() {
        let state = SyncState {
            error: Some("Both a title and text are required.".to_string()),
            draft: PostDraft::new("", "hi"),
            ..SyncState::default()
        };

        let rendered = render(&ada(), &state);

        assert!(rendered.contains("draft: title=\"\" text=\"hi\"\n"));
    }
}
