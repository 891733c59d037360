//! Shared application state for the gateway

use sqlx::SqlitePool;

use crewdesk_auth::Authenticator;
use crewdesk_config::{AppConfig, AuthConfig};
use crewdesk_users::UserService;

use crate::error::{ApiError, ApiResult};

/// Shared application state containing all services
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    /// Credential checks and token lifecycle
    pub authenticator: Authenticator,
    /// User management service
    pub user_service: UserService,
}

impl GatewayState {
    /// Create a new gateway state with all services initialized
    pub fn new(pool: SqlitePool, auth_config: AuthConfig) -> Self {
        let authenticator = Authenticator::new(pool.clone(), auth_config);
        let user_service = UserService::new(pool.clone());

        Self {
            pool,
            authenticator,
            user_service,
        }
    }

    /// Create gateway state from application configuration
    pub async fn from_config(config: &AppConfig) -> ApiResult<Self> {
        let pool = crewdesk_database::initialize_database(&config.database)
            .await
            .map_err(|e| ApiError::internal(format!("failed to initialize database: {e}")))?;

        Ok(Self::new(pool, config.auth.clone()))
    }

    /// Get an authenticator reference
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Get a user service reference
    pub fn user_service(&self) -> &UserService {
        &self.user_service
    }
}
