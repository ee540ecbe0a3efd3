use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The user resolved for the current request.
///
/// Inserted into request extensions by the auth middleware and handed to the
/// file service explicitly; nothing reads it from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Claims carried by a session token issued by the login service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id, as a decimal string
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
}
