use std::collections::HashSet;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tempfile::TempDir;

use crewdesk_auth::{hash_password, AuthError, Authenticator};
use crewdesk_config::AuthConfig;
use crewdesk_database::{NewUserRecord, UserRepository, UserRole};

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

fn default_auth_config() -> AuthConfig {
    AuthConfig {
        session_ttl_seconds: 3_600,
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    _temp_dir: TempDir,
    config: AuthConfig,
}

impl TestContext {
    async fn new(config: AuthConfig) -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let mut options = SqliteConnectOptions::from_str(&db_url)?;
        options = options.create_if_missing(true);
        options = options.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        let authenticator = Authenticator::new(pool.clone(), config.clone());

        Ok(Self {
            pool,
            authenticator,
            _temp_dir: temp_dir,
            config,
        })
    }

    async fn new_default() -> TestResult<Self> {
        Self::new(default_auth_config()).await
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    async fn seed_user(&self, name: &str, email: &str, password: &str) -> TestResult<i64> {
        let repo = UserRepository::new(self.pool.clone());
        repo.insert_many(&[NewUserRecord {
            name: name.to_string(),
            email: email.to_string(),
            role: UserRole::Developer,
            password_hash: hash_password(password)?,
        }])
        .await?;

        let user = repo
            .find_by_email(email)
            .await?
            .expect("seeded user should exist");
        Ok(user.id)
    }
}

#[tokio::test]
async fn login_with_password_returns_session_for_valid_credentials() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user_id = ctx.seed_user("Alice", "alice@example.com", "s3cret").await?;

    let (user, session) = ctx
        .authenticator()
        .login_with_password("alice@example.com", "s3cret")
        .await?;

    assert_eq!(user.id, user_id);
    assert_eq!(session.user_id, user_id);

    let ttl = Duration::seconds(ctx.config.session_ttl_seconds as i64);
    let remaining = session.expires_at - Utc::now();
    assert!(
        (remaining - ttl).num_seconds().abs() <= 2,
        "session ttl should respect configuration"
    );

    let stored_expires: String =
        sqlx::query_scalar("SELECT expires_at FROM sessions WHERE token = ?")
            .bind(&session.token)
            .fetch_one(ctx.pool())
            .await?;
    let parsed = DateTime::parse_from_rfc3339(&stored_expires)?.with_timezone(&Utc);
    assert_eq!(parsed, session.expires_at);

    Ok(())
}

#[tokio::test]
async fn login_with_password_rejects_incorrect_secret() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.seed_user("Alice", "alice@example.com", "s3cret").await?;

    let err = ctx
        .authenticator()
        .login_with_password("alice@example.com", "bad-secret")
        .await
        .expect_err("expected invalid password");
    assert!(matches!(err, AuthError::InvalidCredentials));

    let session_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(session_count, 0, "no sessions should be issued on failure");

    Ok(())
}

#[tokio::test]
async fn login_with_password_rejects_unknown_email() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let err = ctx
        .authenticator()
        .login_with_password("unknown@example.com", "secret")
        .await
        .expect_err("expected unknown email to fail");
    assert!(matches!(err, AuthError::InvalidCredentials));
    Ok(())
}

#[tokio::test]
async fn login_with_password_rejects_soft_deleted_user() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user_id = ctx.seed_user("Alice", "alice@example.com", "s3cret").await?;

    UserRepository::new(ctx.pool().clone())
        .soft_delete(user_id)
        .await?;

    let err = ctx
        .authenticator()
        .login_with_password("alice@example.com", "s3cret")
        .await
        .expect_err("soft-deleted user must not log in");
    assert!(matches!(err, AuthError::InvalidCredentials));
    Ok(())
}

#[tokio::test]
async fn authenticate_token_returns_user_and_session_for_active_token() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user_id = ctx.seed_user("Alice", "alice@example.com", "s3cret").await?;
    let (_, session) = ctx
        .authenticator()
        .login_with_password("alice@example.com", "s3cret")
        .await?;

    let (resolved_user, resolved_session) = ctx
        .authenticator()
        .authenticate_token(&session.token)
        .await?;

    assert_eq!(resolved_user.id, user_id);
    assert_eq!(resolved_session.token, session.token);
    Ok(())
}

#[tokio::test]
async fn authenticate_token_deletes_expired_sessions() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user_id = ctx.seed_user("Alice", "alice@example.com", "s3cret").await?;

    let token = "expired-token";
    let created_at = (Utc::now() - Duration::hours(2)).to_rfc3339();
    let expires_at = (Utc::now() - Duration::hours(1)).to_rfc3339();

    sqlx::query(
        "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(token)
    .bind(&created_at)
    .bind(&expires_at)
    .execute(ctx.pool())
    .await?;

    let err = ctx
        .authenticator()
        .authenticate_token(token)
        .await
        .expect_err("expired token should be rejected");
    assert!(matches!(err, AuthError::SessionExpired));

    let remaining: Option<i64> = sqlx::query_scalar("SELECT 1 FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(ctx.pool())
        .await?;
    assert!(
        remaining.is_none(),
        "expired session should be removed from the database"
    );

    Ok(())
}

#[tokio::test]
async fn authenticate_token_rejects_unknown_token() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let err = ctx
        .authenticator()
        .authenticate_token("missing-token")
        .await
        .expect_err("unknown token should not authenticate");
    assert!(matches!(err, AuthError::SessionNotFound));
    Ok(())
}

#[tokio::test]
async fn authenticate_token_rejects_soft_deleted_user() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let user_id = ctx.seed_user("Alice", "alice@example.com", "s3cret").await?;
    let (_, session) = ctx
        .authenticator()
        .login_with_password("alice@example.com", "s3cret")
        .await?;

    UserRepository::new(ctx.pool().clone())
        .soft_delete(user_id)
        .await?;

    let err = ctx
        .authenticator()
        .authenticate_token(&session.token)
        .await
        .expect_err("deleted user's token should stop resolving");
    assert!(matches!(err, AuthError::SessionNotFound));
    Ok(())
}

#[tokio::test]
async fn revoke_token_removes_only_the_presented_session() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.seed_user("Alice", "alice@example.com", "s3cret").await?;

    let (_, first) = ctx
        .authenticator()
        .login_with_password("alice@example.com", "s3cret")
        .await?;
    let (_, second) = ctx
        .authenticator()
        .login_with_password("alice@example.com", "s3cret")
        .await?;

    ctx.authenticator().revoke_token(&first.token).await?;

    let err = ctx
        .authenticator()
        .authenticate_token(&first.token)
        .await
        .expect_err("revoked token must be invalid");
    assert!(matches!(err, AuthError::SessionNotFound));

    // The sibling session survives.
    let (_, still_valid) = ctx.authenticator().authenticate_token(&second.token).await?;
    assert_eq!(still_valid.token, second.token);

    Ok(())
}

#[tokio::test]
async fn revoke_token_rejects_unknown_token() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let err = ctx
        .authenticator()
        .revoke_token("missing-token")
        .await
        .expect_err("revoking an unknown token should fail");
    assert!(matches!(err, AuthError::SessionNotFound));
    Ok(())
}

#[tokio::test]
async fn issued_tokens_are_unique_urlsafe_base64() -> TestResult {
    let ctx = TestContext::new_default().await?;
    ctx.seed_user("Alice", "alice@example.com", "s3cret").await?;

    let mut tokens = HashSet::new();
    for _ in 0..5 {
        let (_, session) = ctx
            .authenticator()
            .login_with_password("alice@example.com", "s3cret")
            .await?;
        assert!(
            URL_SAFE_NO_PAD.decode(session.token.as_bytes()).is_ok(),
            "token should be URL safe base64"
        );
        assert!(
            tokens.insert(session.token.clone()),
            "tokens should be unique per session"
        );
    }
    Ok(())
}
