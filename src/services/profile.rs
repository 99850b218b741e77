//! Profile updates that change access decisions.

use sqlx::PgPool;
use uuid::Uuid;

const MAX_NAME_LEN: usize = 120;

/// Collapse whitespace and bound the display name. `None` when blank.
#[must_use]
pub fn normalize_name(name: &str) -> Option<String> {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.chars().take(MAX_NAME_LEN).collect())
}

/// Mark onboarding finished and store the display name.
pub async fn complete_onboarding(pool: &PgPool, user_id: Uuid, name: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET onboarding = TRUE, name = $2, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Clear the `new_account` flag once the initial credentials were replaced.
pub async fn acknowledge_new_account(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET new_account = FALSE, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
