//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own persistence and session plumbing so route handlers
//! stay focused on protocol translation and access gating.

pub mod email_auth;
pub mod hub;
pub mod profile;
pub mod session;
