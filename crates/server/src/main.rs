use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use shared::{
    domain::{Post, PostId, User},
    error::{ApiError, ApiException, ErrorCode},
    protocol::CreatePostRequest,
};
use tracing::{info, warn};

mod config;
mod store;

use config::load_settings;
use store::PostDatabase;

struct AppState {
    db: PostDatabase,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = load_settings();
    let db = match &settings.seed_path {
        Some(path) => {
            let db = PostDatabase::load_seed(path)?;
            info!(
                seed = %path.display(),
                users = db.list_users().await.len(),
                posts = db.list_posts().await.len(),
                "post store seeded"
            );
            db
        }
        None => PostDatabase::default(),
    };

    let app = build_router(Arc::new(AppState { db }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "post store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/users", get(http_list_users))
        .route("/posts", get(http_list_posts).post(http_create_post))
        .route("/posts/:post_id", delete(http_delete_post))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_users(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    Json(state.db.list_users().await)
}

async fn http_list_posts(State(state): State<Arc<AppState>>) -> Json<Vec<Post>> {
    Json(state.db.list_posts().await)
}

async fn http_create_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let post = state.db.create_post(req).await.map_err(reject)?;
    info!(post_id = %post.id, user_id = %post.user_id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn http_delete_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> ApiResult<StatusCode> {
    let removed = state
        .db
        .delete_post(&PostId::new(post_id))
        .await
        .map_err(reject)?;
    info!(post_id = %removed.id, user_id = %removed.user_id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn reject(err: ApiException) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
    };
    warn!(%status, error = %err, "request rejected");
    (status, Json(err.into()))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
