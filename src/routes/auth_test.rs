use axum::http::{Request, header};
use gate::{RedirectTargets, Role};

use super::*;
use crate::state::test_helpers::{StubDirectory, test_app_state};

fn parts_with_cookie(cookie: Option<&str>) -> axum::http::request::Parts {
    let mut builder = Request::builder().uri("/dashboard");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(()).unwrap().into_parts().0
}

// =============================================================================
// CurrentSession
// =============================================================================

#[tokio::test]
async fn missing_cookie_is_signed_out() {
    let state = test_app_state(StubDirectory::default());
    let mut parts = parts_with_cookie(None);
    let Ok(current) = CurrentSession::from_request_parts(&mut parts, &state).await;
    assert_eq!(current.session, Session::signed_out());
    assert!(current.token.is_none());
}

#[tokio::test]
async fn empty_cookie_is_signed_out() {
    let state = test_app_state(StubDirectory::default());
    let mut parts = parts_with_cookie(Some("session_token="));
    let Ok(current) = CurrentSession::from_request_parts(&mut parts, &state).await;
    assert!(current.token.is_none());
}

#[tokio::test]
async fn known_cookie_resolves_session() {
    let id = Uuid::new_v4();
    let session = Session::signed_in(id).with_profile(true, false);
    let state = test_app_state(StubDirectory::with(&[("tok", session.clone())]));
    let mut parts = parts_with_cookie(Some("session_token=tok"));

    let Ok(current) = CurrentSession::from_request_parts(&mut parts, &state).await;
    assert_eq!(current.session, session);
    assert_eq!(current.token.as_deref(), Some("tok"));
}

#[tokio::test]
async fn unknown_cookie_is_signed_out_but_keeps_token() {
    let state = test_app_state(StubDirectory::default());
    let mut parts = parts_with_cookie(Some("session_token=stale"));
    let Ok(current) = CurrentSession::from_request_parts(&mut parts, &state).await;
    assert!(!current.session.is_authenticated);
    assert_eq!(current.token.as_deref(), Some("stale"));
}

#[tokio::test]
async fn provider_failure_fails_closed() {
    let directory = StubDirectory { fail_token: Some("tok".to_owned()), ..StubDirectory::default() };
    let state = test_app_state(directory);
    let mut parts = parts_with_cookie(Some("session_token=tok"));
    let Ok(current) = CurrentSession::from_request_parts(&mut parts, &state).await;
    assert!(current.session.resolution_failed);
    assert!(!current.session.is_authenticated);
}

// =============================================================================
// AuthUser
// =============================================================================

#[tokio::test]
async fn auth_user_requires_session() {
    let state = test_app_state(StubDirectory::default());
    let mut parts = parts_with_cookie(None);
    let err = AuthUser::from_request_parts(&mut parts, &state).await.err();
    assert_eq!(err, Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn auth_user_reports_provider_outage() {
    let directory = StubDirectory { fail_token: Some("tok".to_owned()), ..StubDirectory::default() };
    let state = test_app_state(directory);
    let mut parts = parts_with_cookie(Some("session_token=tok"));
    let err = AuthUser::from_request_parts(&mut parts, &state).await.err();
    assert_eq!(err, Some(StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn auth_user_extracts_identity() {
    let id = Uuid::new_v4();
    let state = test_app_state(StubDirectory::with(&[("tok", Session::signed_in(id))]));
    let mut parts = parts_with_cookie(Some("session_token=tok"));
    let auth = AuthUser::from_request_parts(&mut parts, &state).await.ok().unwrap();
    assert_eq!(auth.user_id, id);
    assert_eq!(auth.token, "tok");
}

// =============================================================================
// Handlers and helpers
// =============================================================================

#[tokio::test]
async fn me_returns_snapshot() {
    let session = Session::signed_in(Uuid::new_v4()).with_role(Role::Admin);
    let Json(body) = me(CurrentSession { session: session.clone(), token: Some("tok".to_owned()) }).await;
    assert_eq!(body, session);
}

#[test]
fn landing_is_dashboard_for_ready_users() {
    let session = Session::signed_in(Uuid::new_v4()).with_profile(true, false);
    assert_eq!(landing_after_sign_in(&session, &RedirectTargets::default()), "/dashboard");
}

#[test]
fn landing_is_onboarding_for_new_users() {
    let id = Uuid::new_v4();
    let session = Session::signed_in(id).with_profile(false, true);
    assert_eq!(landing_after_sign_in(&session, &RedirectTargets::default()), format!("/onboarding/{id}"));
}

#[test]
fn landing_is_dashboard_when_profile_unknown() {
    let session = Session::signed_in(Uuid::new_v4());
    assert_eq!(landing_after_sign_in(&session, &RedirectTargets::default()), "/dashboard");
}

#[test]
fn cleared_cookie_expires_immediately() {
    let cookie = cleared_session_cookie(true);
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.http_only(), Some(true));
}

#[test]
fn session_cookie_is_http_only_lax() {
    let cookie = session_cookie("abc".to_owned(), false);
    assert_eq!(cookie.value(), "abc");
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
}
