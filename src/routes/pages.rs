//! Gated page routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected view is answered after running `gate::decide` against the
//! request's session: a denial becomes a `303 See Other` to the guard's
//! redirect target, an allow renders the page shell. Layout and styling
//! belong to the frontend bundle; the shell only names the view and its
//! render state.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use gate::{AccessPolicy, GuardView, RedirectTargets, Session, decide};
use uuid::Uuid;

use super::auth::CurrentSession;
use crate::state::AppState;

/// Views that mount behind a guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Admin,
    SignIn,
    Onboarding,
}

impl Page {
    #[must_use]
    pub fn policy(self) -> AccessPolicy {
        match self {
            Self::Dashboard => AccessPolicy::protected(),
            Self::Admin => AccessPolicy::admin(),
            Self::SignIn => AccessPolicy::public_only(),
            Self::Onboarding => AccessPolicy::onboarding(),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Admin => "admin",
            Self::SignIn => "signin",
            Self::Onboarding => "onboarding",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Aleen.ai",
            Self::Admin => "Aleen.ai Admin Panel",
            Self::SignIn => "Aleen.ai - Entrar",
            Self::Onboarding => "Aleen.ai - Onboarding",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Some(Self::Dashboard),
            "admin" => Some(Self::Admin),
            "signin" | "sign-in" => Some(Self::SignIn),
            "onboarding" => Some(Self::Onboarding),
            _ => None,
        }
    }
}

/// Run the guard for `page` and turn the decision into a response.
pub(crate) fn gate_page(page: Page, session: &Session, targets: &RedirectTargets) -> Response {
    let decision = decide(session, &page.policy());
    if let Some(path) = decision.redirect_target(session, targets) {
        tracing::debug!(page = page.name(), ?decision, %path, "page denied");
        return Redirect::to(&path).into_response();
    }
    Html(render_shell(page, decision.view(session))).into_response()
}

pub(crate) fn render_shell(page: Page, view: GuardView) -> String {
    let (state, welcome) = match view {
        GuardView::Loading => ("loading", false),
        GuardView::Content { welcome_pending } => ("content", welcome_pending),
        GuardView::Nothing => ("empty", false),
    };
    let welcome_attr = if welcome { r#" data-welcome="pending""# } else { "" };
    format!(
        r#"<!doctype html>
<html lang="pt-BR">
<head><meta charset="utf-8"><title>{title}</title></head>
<body><main id="app" data-view="{view}" data-state="{state}"{welcome_attr}></main></body>
</html>
"#,
        title = page.title(),
        view = page.name(),
    )
}

/// `GET /`: the gated dashboard decides where a visitor belongs.
pub async fn root() -> Redirect {
    Redirect::temporary("/dashboard")
}

/// `GET /dashboard`
pub async fn dashboard(State(state): State<AppState>, current: CurrentSession) -> Response {
    gate_page(Page::Dashboard, &current.session, &state.config.targets)
}

/// `GET /admin`
pub async fn admin(State(state): State<AppState>, current: CurrentSession) -> Response {
    gate_page(Page::Admin, &current.session, &state.config.targets)
}

/// `GET /auth/signin`
pub async fn sign_in(State(state): State<AppState>, current: CurrentSession) -> Response {
    gate_page(Page::SignIn, &current.session, &state.config.targets)
}

/// `GET /onboarding/{user_id}`: users may only open their own onboarding.
pub async fn onboarding(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(user_id): Path<Uuid>,
) -> Response {
    let session = &current.session;
    let targets = &state.config.targets;
    if let Some(own) = session.user_id.filter(|own| *own != user_id && session.is_authenticated) {
        return Redirect::to(&targets.onboarding_for(Some(own))).into_response();
    }
    gate_page(Page::Onboarding, session, targets)
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
