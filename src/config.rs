//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; the admin secrets are cached in memory
//! for the life of the process.

use std::env;

const DEFAULT_ADMIN_PASSWORD: &str = "bonsai";
const DEFAULT_ADMIN_SECRET: &str = "dev-admin-secret";

/// Which backing store the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store; state is lost on restart.
    Memory,
    /// Google Firestore (emulator when FIRESTORE_EMULATOR_HOST is set).
    Firestore,
}

/// How admin requests prove who they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAuthMode {
    /// `admin_pass` cookie set by the login endpoint.
    Cookie,
    /// Signed bearer token returned by the login endpoint.
    Token,
}

impl AdminAuthMode {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "cookie" => Ok(Self::Cookie),
            "token" => Ok(Self::Token),
            other => Err(ConfigError::Invalid("ADMIN_AUTH_MODE", other.to_string())),
        }
    }
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "memory" => Ok(Self::Memory),
            "firestore" => Ok(Self::Firestore),
            other => Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Deployment environment name, used to namespace store keys
    pub environment: String,
    /// Backing store selection
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Admin gate mode
    pub admin_auth_mode: AdminAuthMode,

    // --- Secrets ---
    /// Password accepted by the admin login endpoint
    pub admin_password: String,
    /// HMAC key for admin session tokens (raw bytes)
    pub admin_token_secret: Vec<u8>,
}

impl Config {
    /// Config for tests: in-memory store, cookie admin mode.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            environment: "test".to_string(),
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            admin_auth_mode: AdminAuthMode::Cookie,
            admin_password: "test_admin_password".to_string(),
            admin_token_secret: b"test_admin_secret_32_bytes_min!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "dev".to_string());

        let config = Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            environment,
            store_backend: StoreBackend::parse(&env::var("STORE_BACKEND").unwrap_or_default())?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            admin_auth_mode: AdminAuthMode::parse(
                &env::var("ADMIN_AUTH_MODE").unwrap_or_default(),
            )?,
            admin_password: env::var("ADMIN_PASSWORD")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
            admin_token_secret: env::var("ADMIN_JWT_SECRET")
                .unwrap_or_else(|_| DEFAULT_ADMIN_SECRET.to_string())
                .into_bytes(),
        };

        if config.is_production() && config.admin_token_secret == DEFAULT_ADMIN_SECRET.as_bytes()
        {
            tracing::warn!("ADMIN_JWT_SECRET not set in production, using development default");
        }
        if config.is_production() && config.admin_password == DEFAULT_ADMIN_PASSWORD {
            tracing::warn!("ADMIN_PASSWORD not set in production, using development default");
        }

        Ok(config)
    }

    /// Whether this process serves the production deployment.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
