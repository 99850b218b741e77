//! Session snapshot consumed by guards.
//!
//! SYSTEM CONTEXT
//! ==============
//! A session provider owns the current `Session` and publishes a new value on
//! every auth event (sign-in, sign-out, profile update). Guards only read
//! snapshots; they never mutate them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization role carried as a claim on the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl Role {
    /// Parse the stored role column. Unknown values fall back to `Member`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            _ => Self::Member,
        }
    }
}

/// Authentication and profile snapshot for the active user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub user_id: Option<Uuid>,
    pub onboarding_complete: bool,
    /// Profile row has been fetched. Onboarding state is unknown until then.
    pub profile_loaded: bool,
    /// Account still uses its initial credentials.
    pub new_account: bool,
    pub role: Role,
    /// The provider failed to resolve the session.
    pub resolution_failed: bool,
}

impl Session {
    /// Snapshot published at provider mount, before resolution completes.
    #[must_use]
    pub fn loading() -> Self {
        Self { is_loading: true, ..Self::signed_out() }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            is_loading: false,
            is_authenticated: false,
            user_id: None,
            onboarding_complete: false,
            profile_loaded: false,
            new_account: false,
            role: Role::Member,
            resolution_failed: false,
        }
    }

    /// Snapshot published when the provider could not resolve the session.
    #[must_use]
    pub fn failed() -> Self {
        Self { resolution_failed: true, ..Self::signed_out() }
    }

    /// Authenticated session whose profile has not been fetched yet.
    #[must_use]
    pub fn signed_in(user_id: Uuid) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(user_id),
            ..Self::signed_out()
        }
    }

    /// Attach loaded profile state.
    #[must_use]
    pub fn with_profile(mut self, onboarding_complete: bool, new_account: bool) -> Self {
        self.profile_loaded = true;
        self.onboarding_complete = onboarding_complete;
        self.new_account = new_account;
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_authenticated && self.role == Role::Admin
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
