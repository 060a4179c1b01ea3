use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of access tokens. Default: 7 days.
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_secs: i64,
    /// Lifetime of refresh tokens. Default: 14 days.
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_secs: i64,
    /// Lifetime of password-reset tokens. Default: 15 minutes.
    #[serde(default = "default_reset_token_ttl")]
    pub reset_token_ttl_secs: i64,
    /// How long an emailed one-time code stays valid. Default: 10 minutes.
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_secs: i64,
}

fn default_access_token_ttl() -> i64 {
    7 * 24 * 60 * 60
}
fn default_refresh_token_ttl() -> i64 {
    14 * 24 * 60 * 60
}
fn default_reset_token_ttl() -> i64 {
    15 * 60
}
fn default_otp_ttl() -> i64 {
    10 * 60
}

impl AuthConfig {
    /// Auth settings with default lifetimes for the given secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl_secs: default_access_token_ttl(),
            refresh_token_ttl_secs: default_refresh_token_ttl(),
            reset_token_ttl_secs: default_reset_token_ttl(),
            otp_ttl_secs: default_otp_ttl(),
        }
    }
}

/// Which notification sink delivers one-time codes.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackend {
    Smtp,
    #[default]
    Log,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    #[serde(default)]
    pub backend: EmailBackend,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_from")]
    pub from: String,
}

fn default_smtp_port() -> u16 {
    465
}
fn default_from() -> String {
    "noreply@localhost".into()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            backend: EmailBackend::default(),
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: default_from(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding uploaded blog images.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
    /// Public URL prefix under which `media_dir` is served.
    #[serde(default = "default_media_url")]
    pub media_url: String,
    /// Maximum size of a single image upload in bytes. Default: 8 MiB.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u64,
}

fn default_media_dir() -> String {
    "./data/media".into()
}
fn default_media_url() -> String {
    "/media".into()
}
fn default_max_image_size() -> u64 {
    8 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_dir: default_media_dir(),
            media_url: default_media_url(),
            max_image_size: default_max_image_size(),
        }
    }
}

/// Superuser created at startup if no account uses `email` yet.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SCRIBE__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("SCRIBE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
