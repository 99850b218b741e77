//! Portal configuration parsed from environment variables.
//!
//! Required:
//! - `DATABASE_URL`
//!
//! Optional:
//! - `PORT`: default 3000
//! - `SERVICE_NAME`: reported by `/api/health`, default `aleen-portal`
//! - `SERVICE_VERSION`: reported by `/api/health`, default crate version
//! - `ADMIN_EMAILS`: comma separated emails granted the admin role
//! - `COOKIE_SECURE`: `1/true/yes/on` or `0/false/no/off`, default false
//! - `RESEND_API_KEY` + `RESEND_FROM`: access-code email delivery
//! - `ADMIN_FALLBACK_PATH`: landing page for non-admins, default `/dashboard`;
//!   may not point back at the admin page
//! - `DB_MAX_CONNECTIONS`: pool size, default 5

use gate::RedirectTargets;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SERVICE_NAME: &str = "aleen-portal";
pub const DEFAULT_RESEND_FROM: &str = "Aleen.ai <acesso@aleen.ai>";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Route of the admin panel page.
pub const ADMIN_PAGE_PATH: &str = "/admin";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub service_name: String,
    pub service_version: String,
    /// Lowercased admin emails.
    pub admin_emails: Vec<String>,
    pub cookie_secure: bool,
    pub targets: RedirectTargets,
    /// `None` when access codes are only logged (local development).
    pub resend: Option<ResendConfig>,
}

impl PortalConfig {
    /// Build typed config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "COOKIE_SECURE", value: raw })?,
            None => false,
        };

        let resend = lookup("RESEND_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| ResendConfig {
                api_key,
                from: lookup("RESEND_FROM").unwrap_or_else(|| DEFAULT_RESEND_FROM.to_owned()),
            });

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", value: raw })?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let mut targets = RedirectTargets::default();
        if let Some(path) = lookup("ADMIN_FALLBACK_PATH") {
            if !path.starts_with('/') || is_admin_page(&path) {
                return Err(ConfigError::Invalid { key: "ADMIN_FALLBACK_PATH", value: path });
            }
            targets.admin_fallback = path;
        }

        Ok(Self {
            database_url,
            db_max_connections,
            port,
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_owned()),
            service_version: lookup("SERVICE_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_owned()),
            admin_emails: parse_email_list(lookup("ADMIN_EMAILS").as_deref()),
            cookie_secure,
            targets,
            resend,
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A non-admin sent to the admin page would be bounced back to it forever.
fn is_admin_page(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/').eq_ignore_ascii_case(ADMIN_PAGE_PATH)
}

fn parse_email_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
