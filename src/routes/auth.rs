//! Auth routes: email access-code sign-in, sign-out and the session snapshot.

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use gate::{AccessPolicy, Session, decide};
use serde::Deserialize;
use time::Duration;
use uuid::Uuid;

use crate::services::{email_auth, session};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Session snapshot for the request. Never rejects: a missing cookie is a
/// signed-out session and a provider error is a failed one.
pub struct CurrentSession {
    pub session: Session,
    pub token: Option<String>,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = session_token(&jar) else {
            return Ok(Self { session: Session::signed_out(), token: None });
        };

        let app_state = AppState::from_ref(state);
        let session = resolve_session(&app_state, &token).await;
        Ok(Self { session, token: Some(token) })
    }
}

/// Session token from the request cookies, if any.
pub(crate) fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

/// Resolve `token`, failing closed: unknown tokens are signed out and
/// directory errors yield a failed session.
pub(crate) async fn resolve_session(state: &AppState, token: &str) -> Session {
    match state.sessions.resolve(token).await {
        Ok(Some(session)) => session,
        Ok(None) => Session::signed_out(),
        Err(e) => {
            tracing::error!(error = %e, "session resolution failed; failing closed");
            Session::failed()
        }
    }
}

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user_id: Uuid,
    pub session: Session,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(current) = CurrentSession::from_request_parts(parts, state).await;
        if current.session.resolution_failed {
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        match (current.session.user_id, current.token) {
            (Some(user_id), Some(token)) if current.session.is_authenticated => {
                Ok(Self { user_id, session: current.session, token })
            }
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/auth/me`: current session snapshot (signed out when no cookie).
pub async fn me(current: CurrentSession) -> Json<Session> {
    Json(current.session)
}

#[derive(Deserialize)]
pub struct RequestCodeBody {
    pub email: String,
}

/// `POST /api/auth/email/request-code`: create and deliver an access code.
pub async fn request_email_code(State(state): State<AppState>, Json(body): Json<RequestCodeBody>) -> Response {
    let Some(email) = email_auth::normalize_email(&body.email) else {
        return (StatusCode::BAD_REQUEST, "invalid email").into_response();
    };

    let code = match email_auth::request_access_code(&state.pool, &email).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "access code creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create access code").into_response();
        }
    };

    if let Err(e) = email_auth::deliver_access_code(state.config.resend.as_ref(), &email, &code).await {
        tracing::error!(error = %e, "access code delivery failed");
        return (StatusCode::BAD_GATEWAY, "Failed to send access code").into_response();
    }

    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
pub struct VerifyCodeBody {
    pub email: String,
    pub code: String,
}

/// `POST /api/auth/email/verify-code`: consume a code, set the session cookie
/// and tell the client where to go next.
pub async fn verify_email_code(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyCodeBody>,
) -> Response {
    let user_id = match email_auth::verify_access_code(&state.pool, &body.email, &body.code).await {
        Ok(id) => id,
        Err(email_auth::EmailAuthError::InvalidEmail | email_auth::EmailAuthError::InvalidCode) => {
            return (StatusCode::BAD_REQUEST, "invalid email or code").into_response();
        }
        Err(email_auth::EmailAuthError::VerificationFailed) => {
            return (StatusCode::UNAUTHORIZED, "expired or incorrect code").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "access code verification failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to verify code").into_response();
        }
    };

    let token = match session::create_session(&state.pool, user_id).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session").into_response();
        }
    };

    let resolved = match state.sessions.resolve(&token).await {
        Ok(Some(s)) => s,
        Ok(None) => Session::signed_in(user_id),
        Err(e) => {
            tracing::warn!(error = %e, "fresh session could not be resolved");
            Session::signed_in(user_id)
        }
    };
    tracing::info!(%user_id, "signed in");

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    let redirect = landing_after_sign_in(&resolved, &state.config.targets);
    (jar, Json(serde_json::json!({ "redirect": redirect, "session": resolved }))).into_response()
}

/// Where a freshly signed-in user should land: the dashboard, unless its
/// guard would bounce them (e.g. onboarding still pending).
pub(crate) fn landing_after_sign_in(session: &Session, targets: &gate::RedirectTargets) -> String {
    decide(session, &AccessPolicy::protected())
        .redirect_target(session, targets)
        .unwrap_or_else(|| targets.dashboard.clone())
}

/// `POST /api/auth/signout`: delete session, notify live views, clear cookie.
pub async fn signout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, user_id = %auth.user_id, "session delete failed");
    }
    state.hub.revoke(&auth.token);
    tracing::info!(user_id = %auth.user_id, "signed out");

    let jar = CookieJar::new().add(cleared_session_cookie(state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
