//! Route definitions
//!
//! API routes mounted under /api/v1; health probes live at the root.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{auth, health, leaves, oauth, users};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately so they bypass rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(oauth_routes())
        .merge(user_routes())
        .merge(leave_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/token/refresh", post(auth::refresh_token))
        .route("/auth/me", get(auth::me))
        .route("/auth/password", post(auth::change_password))
}

fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/google", post(oauth::google_login))
        .route("/auth/google/callback", get(oauth::google_callback))
        .route("/auth/google/url", get(oauth::google_auth_url))
        .route("/auth/github", post(oauth::github_login))
        .route("/auth/github/url", get(oauth::github_auth_url))
}

fn user_routes() -> Router<AppState> {
    Router::new().route("/users/:user_id/role", patch(users::update_role))
}

fn leave_routes() -> Router<AppState> {
    Router::new()
        .route("/leaves", get(leaves::list_leaves).post(leaves::submit_leave))
        .route("/leaves/stats", get(leaves::leave_stats))
        .route(
            "/leaves/:leave_id",
            get(leaves::get_leave).patch(leaves::edit_leave),
        )
        .route("/leaves/:leave_id/cancel", post(leaves::cancel_leave))
        .route("/leaves/:leave_id/decision", post(leaves::decide_leave))
}
