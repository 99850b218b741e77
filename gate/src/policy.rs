//! Per-route access requirements.

use serde::{Deserialize, Serialize};

/// Requirements a route imposes before its content renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub require_auth: bool,
    pub require_onboarding: bool,
    pub require_admin: bool,
}

impl AccessPolicy {
    /// Signed-in users with a finished onboarding (dashboard and friends).
    #[must_use]
    pub const fn protected() -> Self {
        Self { require_auth: true, require_onboarding: true, require_admin: false }
    }

    /// Pages only shown to signed-out visitors (sign-in, sign-up).
    #[must_use]
    pub const fn public_only() -> Self {
        Self { require_auth: false, require_onboarding: false, require_admin: false }
    }

    /// The onboarding flow itself: signed in, onboarding not yet required.
    #[must_use]
    pub const fn onboarding() -> Self {
        Self { require_auth: true, require_onboarding: false, require_admin: false }
    }

    #[must_use]
    pub const fn admin() -> Self {
        Self { require_auth: true, require_onboarding: false, require_admin: true }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::protected()
    }
}
