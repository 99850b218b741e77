//! Pure access decision.
//!
//! DESIGN
//! ======
//! `decide` is a pure function of `(Session, AccessPolicy)`. Everything with a
//! side effect (navigation, rendering) lives in the guard shell, so the rules
//! here can be tested without a runtime.
//!
//! Check order matters:
//! 1. loading sessions are always `Pending`
//! 2. unresolvable sessions fail closed for auth-requiring routes
//! 3. sign-in requirement, then the signed-out-only requirement
//! 4. profile checks (onboarding, admin) only for authenticated sessions

use serde::{Deserialize, Serialize};

use crate::policy::AccessPolicy;
use crate::session::{Role, Session};

/// Why a forbidden decision was reached. Selects the redirect target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Forbidden {
    /// Signed-in user on a signed-out-only page.
    AlreadySignedIn,
    /// Authenticated user without the admin role.
    NotAdmin,
}

/// Outcome of evaluating a session against a policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum GuardDecision {
    Pending,
    Allow,
    DenySignIn,
    DenyOnboarding,
    DenyForbidden(Forbidden),
}

/// Render output for one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum GuardView {
    /// Neutral placeholder while the session resolves.
    Loading,
    /// Guarded content. New accounts get a first-login welcome overlay until
    /// they acknowledge it.
    Content { welcome_pending: bool },
    /// Denied; a redirect has been requested.
    Nothing,
}

/// Navigation targets used on denial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTargets {
    pub sign_in: String,
    pub dashboard: String,
    /// Onboarding path prefix; the user id is appended as the last segment.
    pub onboarding_prefix: String,
    /// Landing page for authenticated users without the admin role.
    pub admin_fallback: String,
}

impl Default for RedirectTargets {
    fn default() -> Self {
        Self {
            sign_in: "/auth/signin".to_owned(),
            dashboard: "/dashboard".to_owned(),
            onboarding_prefix: "/onboarding".to_owned(),
            admin_fallback: "/dashboard".to_owned(),
        }
    }
}

impl RedirectTargets {
    /// Onboarding path for a user, or the bare prefix when the id is unknown.
    #[must_use]
    pub fn onboarding_for(&self, user_id: Option<uuid::Uuid>) -> String {
        let prefix = self.onboarding_prefix.trim_end_matches('/');
        match user_id {
            Some(id) => format!("{prefix}/{id}"),
            None => prefix.to_owned(),
        }
    }
}

/// Evaluate `session` against `policy`.
#[must_use]
pub fn decide(session: &Session, policy: &AccessPolicy) -> GuardDecision {
    if session.is_loading {
        return GuardDecision::Pending;
    }

    if session.resolution_failed && policy.require_auth {
        return GuardDecision::DenySignIn;
    }

    if policy.require_auth && !session.is_authenticated {
        return GuardDecision::DenySignIn;
    }

    if !policy.require_auth && session.is_authenticated {
        return GuardDecision::DenyForbidden(Forbidden::AlreadySignedIn);
    }

    if !session.is_authenticated {
        return GuardDecision::Allow;
    }

    if policy.require_onboarding {
        if !session.profile_loaded {
            return GuardDecision::Pending;
        }
        if !session.onboarding_complete {
            return GuardDecision::DenyOnboarding;
        }
    }

    if policy.require_admin {
        // The role is read alongside the profile; judge it only once loaded.
        if !session.profile_loaded {
            return GuardDecision::Pending;
        }
        if session.role != Role::Admin {
            return GuardDecision::DenyForbidden(Forbidden::NotAdmin);
        }
    }

    GuardDecision::Allow
}

impl GuardDecision {
    #[must_use]
    pub fn is_denial(self) -> bool {
        matches!(self, Self::DenySignIn | Self::DenyOnboarding | Self::DenyForbidden(_))
    }

    /// Path to navigate to for a denial; `None` for `Allow` and `Pending`.
    #[must_use]
    pub fn redirect_target(self, session: &Session, targets: &RedirectTargets) -> Option<String> {
        match self {
            Self::Pending | Self::Allow => None,
            Self::DenySignIn => Some(targets.sign_in.clone()),
            Self::DenyOnboarding => Some(targets.onboarding_for(session.user_id)),
            Self::DenyForbidden(Forbidden::AlreadySignedIn) => Some(targets.dashboard.clone()),
            Self::DenyForbidden(Forbidden::NotAdmin) => Some(targets.admin_fallback.clone()),
        }
    }

    #[must_use]
    pub fn view(self, session: &Session) -> GuardView {
        match self {
            Self::Pending => GuardView::Loading,
            Self::Allow => GuardView::Content {
                welcome_pending: session.is_authenticated && session.new_account,
            },
            Self::DenySignIn | Self::DenyOnboarding | Self::DenyForbidden(_) => GuardView::Nothing,
        }
    }
}

#[cfg(test)]
#[path = "decision_test.rs"]
mod tests;
