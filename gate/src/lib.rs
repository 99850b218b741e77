//! Page access gating for the Aleen portal.
//!
//! This crate is HTTP- and UI-framework agnostic. The server runs [`decide`]
//! per request; long-lived views mount an [`AccessGuard`] on a session
//! channel and let it drive redirects.

pub mod decision;
pub mod guard;
pub mod policy;
pub mod session;

pub use decision::{Forbidden, GuardDecision, GuardView, RedirectTargets, decide};
pub use guard::{AccessGuard, MountedGuard, Redirector};
pub use policy::AccessPolicy;
pub use session::{Role, Session};
