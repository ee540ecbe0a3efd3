use axum::http::HeaderValue;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::SqlitePool;

use crate::core::config::{AuthConfig, DatabaseConfig};
use crate::core::database::{create_pool, run_migrations};
use crate::features::auth::model::SessionClaims;
use crate::features::auth::{AuthService, CurrentUser, SessionValidator};
use crate::features::files::dtos::FileFormDto;

pub const TEST_SECRET: &str = "test-session-secret";

/// Fresh in-memory store with the real migrations applied
pub async fn setup_pool() -> SqlitePool {
    let pool = create_pool(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}

/// Stand-in for the login service provisioning a user
pub async fn seed_user(pool: &SqlitePool, username: &str) -> CurrentUser {
    sqlx::query_as::<_, CurrentUser>(
        "INSERT INTO users (username) VALUES (?) RETURNING id, username",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .expect("insert user")
}

pub fn auth_service(pool: SqlitePool) -> AuthService {
    let config = AuthConfig::for_tests(TEST_SECRET);
    AuthService::new(
        pool,
        SessionValidator::new(&config.jwt_secret, config.jwt_leeway),
        config.login_url,
        config.cookie_name,
    )
}

/// Sign a one-hour session token the way the login service would
pub fn issue_token(user_id: i64) -> String {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: now + 3600,
        iat: Some(now),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("sign token")
}

pub fn bearer(user_id: i64) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", issue_token(user_id))).expect("header value")
}

pub fn form(title: &str, contents: &[u8]) -> FileFormDto {
    FileFormDto {
        friendly_title: title.to_string(),
        contents: contents.to_vec(),
    }
}
