use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub external_port: u16,
    pub internal_port: u16,
    pub internal_status_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Passphrase-protected RSA private key (PEM)
    pub jwt_secret_key: PathBuf,
    pub jwt_public_key: PathBuf,
    #[serde(skip_serializing, default)]
    pub jwt_passphrase: String,
    /// Shared HMAC secret; when set it replaces the key pair
    #[serde(skip_serializing, default)]
    pub jwt_secret: Option<String>,
    pub jwt_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Server overrides
        if let Ok(v) = env::var("EXTERNAL_PORT") {
            self.server.external_port = v.parse().unwrap_or(self.server.external_port);
        }
        if let Ok(v) = env::var("INTERNAL_PORT") {
            self.server.internal_port = v.parse().unwrap_or(self.server.internal_port);
        }
        if let Ok(v) = env::var("INTERNAL_STATUS_URL") {
            self.server.internal_status_url = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET_KEY") {
            self.security.jwt_secret_key = PathBuf::from(v);
        }
        if let Ok(v) = env::var("JWT_PUBLIC_KEY") {
            self.security.jwt_public_key = PathBuf::from(v);
        }
        if let Ok(v) = env::var("JWT_PASSPHRASE") {
            self.security.jwt_passphrase = v;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("JWT_TOKEN_TTL") {
            self.security.jwt_token_ttl_secs = v.parse().unwrap_or(self.security.jwt_token_ttl_secs);
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_TTL") {
            self.security.refresh_token_ttl_secs = v.parse().unwrap_or(self.security.refresh_token_ttl_secs);
        }

        // Listing overrides
        if let Ok(v) = env::var("LISTING_DEFAULT_PAGE_SIZE") {
            self.listing.default_page_size = v.parse().unwrap_or(self.listing.default_page_size);
        }
        if let Ok(v) = env::var("LISTING_MAX_PAGE_SIZE") {
            self.listing.max_page_size = v.parse().unwrap_or(self.listing.max_page_size);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            server: ServerConfig {
                external_port: 8080,
                internal_port: 8081,
                internal_status_url: "http://localhost:8081/status".to_string(),
            },
            security: SecurityConfig {
                jwt_secret_key: PathBuf::from("config/jwt/private.pem"),
                jwt_public_key: PathBuf::from("config/jwt/public.pem"),
                jwt_passphrase: String::new(),
                jwt_secret: None,
                jwt_token_ttl_secs: 3600,
                refresh_token_ttl_secs: 2_592_000, // 30 days
            },
            listing: ListingConfig {
                default_page_size: 20,
                max_page_size: 100,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            server: ServerConfig {
                external_port: 8080,
                internal_port: 8081,
                internal_status_url: "http://webserver:8081/status".to_string(),
            },
            security: SecurityConfig {
                jwt_secret_key: PathBuf::from("config/jwt/private.pem"),
                jwt_public_key: PathBuf::from("config/jwt/public.pem"),
                jwt_passphrase: String::new(),
                jwt_secret: None,
                jwt_token_ttl_secs: 3600,
                refresh_token_ttl_secs: 2_592_000,
            },
            listing: ListingConfig {
                default_page_size: 20,
                max_page_size: 100,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

/// Loads `.env.local` and `.env` into the process environment. Real
/// environment variables win over `.env.local`, which wins over `.env`.
/// Missing files are fine.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
}
