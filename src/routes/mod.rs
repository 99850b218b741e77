//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Gated pages and the JSON/SSE API share one Axum router. Page responses
//! depend on the caller's session, so they are marked uncacheable.

pub mod account;
pub mod auth;
pub mod health;
pub mod live;
pub mod pages;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ADMIN_PAGE_PATH;
use crate::state::AppState;

/// Gated HTML views.
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::root))
        .route("/dashboard", get(pages::dashboard))
        .route(ADMIN_PAGE_PATH, get(pages::admin))
        .route("/auth/signin", get(pages::sign_in))
        .route("/onboarding/{user_id}", get(pages::onboarding))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0, must-revalidate"),
        ))
}

fn api_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/signout", post(auth::signout))
        .route("/api/auth/email/request-code", post(auth::request_email_code))
        .route("/api/auth/email/verify-code", post(auth::verify_email_code))
        .route("/api/onboarding/complete", post(account::complete_onboarding))
        .route("/api/account/acknowledge-welcome", post(account::acknowledge_welcome))
        .route("/api/session/stream", get(live::session_stream))
        .layer(cors)
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(page_routes())
        .merge(api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
