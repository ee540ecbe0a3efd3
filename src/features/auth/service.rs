use sqlx::SqlitePool;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::CurrentUser;
use crate::features::auth::validator::SessionValidator;

/// Resolves a session token to a user row.
///
/// Users are written by the external login service; this side only reads them.
pub struct AuthService {
    pool: SqlitePool,
    validator: SessionValidator,
    login_url: String,
    cookie_name: String,
}

impl AuthService {
    pub fn new(
        pool: SqlitePool,
        validator: SessionValidator,
        login_url: String,
        cookie_name: String,
    ) -> Self {
        Self {
            pool,
            validator,
            login_url,
            cookie_name,
        }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Validate the token and load its user.
    ///
    /// Bad tokens and unknown users are `Unauthorized`; store faults pass through.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser> {
        let user_id = self.validator.validate_token(token)?;

        let user = self.find_user(user_id).await?;

        user.ok_or_else(|| {
            debug!("Session refers to unknown user id={}", user_id);
            AppError::Unauthorized("Unknown user".to_string())
        })
    }

    pub async fn find_user(&self, user_id: i64) -> Result<Option<CurrentUser>> {
        let user = sqlx::query_as::<_, CurrentUser>("SELECT id, username FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
