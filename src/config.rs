use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub twilio: TwilioConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_user_token_expires_in")]
    pub user_token_expires_in: i64, // seconds
    #[serde(default = "default_admin_token_expires_in")]
    pub admin_token_expires_in: i64, // seconds
}

/// SMTP transport for OTP mails. Without a host the codes are only logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub from_phone: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_upload_dir")]
    pub dir: String,
    #[serde(default = "default_upload_max_bytes")]
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Base URL used to turn stored `/uploads/...` paths into absolute links
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_user_token_expires_in() -> i64 {
    7 * 24 * 3600
}

fn default_admin_token_expires_in() -> i64 {
    24 * 3600
}

fn default_smtp_port() -> u16 {
    587
}

fn default_country_code() -> String {
    "+91".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_upload_max_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_smtp_port(),
            username: None,
            password: None,
            from: None,
        }
    }
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        self.host.as_deref().is_some_and(|h| !h.is_empty())
            && self.username.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_phone: String::new(),
            country_code: default_country_code(),
        }
    }
}

impl TwilioConfig {
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_phone.is_empty()
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_bytes: default_upload_max_bytes(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            public_url: default_public_url(),
        }
    }
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // A missing file means the deployment is configured purely through the environment
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str).map_err(|e| {
                AppError::ConfigError(format!("Failed to parse {config_path}: {e}"))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env()?,
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Failed to read {config_path}: {e}"
                )));
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn from_env() -> AppResult<Self> {
        let database_url = get_env("DATABASE_URL").ok_or_else(|| {
            AppError::ConfigError(
                "DATABASE_URL is not set and no config.toml was found".to_string(),
            )
        })?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                user_token_expires_in: get_env_parse(
                    "JWT_USER_EXPIRES_IN",
                    default_user_token_expires_in(),
                ),
                admin_token_expires_in: get_env_parse(
                    "JWT_ADMIN_EXPIRES_IN",
                    default_admin_token_expires_in(),
                ),
            },
            email: EmailConfig::default(),
            twilio: TwilioConfig::default(),
            uploads: UploadConfig::default(),
            app: AppConfig::default(),
        })
    }

    // Environment variables win over the file, even when it exists
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_USER_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.user_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_ADMIN_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.admin_token_expires_in = n;
        }

        if let Ok(v) = env::var("EMAIL_HOST") {
            self.email.host = Some(v);
        }
        if let Ok(v) = env::var("EMAIL_PORT")
            && let Ok(p) = v.parse()
        {
            self.email.port = p;
        }
        if let Ok(v) = env::var("EMAIL_USER") {
            self.email.username = Some(v);
        }
        if let Ok(v) = env::var("EMAIL_PASSWORD") {
            self.email.password = Some(v);
        }
        if let Ok(v) = env::var("EMAIL_FROM") {
            self.email.from = Some(v);
        }

        if let Ok(v) = env::var("TWILIO_ACCOUNT_SID") {
            self.twilio.account_sid = v;
        }
        if let Ok(v) = env::var("TWILIO_AUTH_TOKEN") {
            self.twilio.auth_token = v;
        }
        if let Ok(v) = env::var("TWILIO_FROM_PHONE") {
            self.twilio.from_phone = v;
        }

        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.uploads.dir = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES")
            && let Ok(n) = v.parse()
        {
            self.uploads.max_bytes = n;
        }

        if let Ok(v) = env::var("APP_ENV") {
            self.app.environment = v;
        }
        if let Ok(v) = env::var("APP_URL") {
            self.app.public_url = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [jwt]
            secret = "s3cret"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.jwt.user_token_expires_in, 604_800);
        assert_eq!(config.jwt.admin_token_expires_in, 86_400);
        assert_eq!(config.email.port, 587);
        assert!(!config.email.is_configured());
        assert!(!config.twilio.is_configured());
        assert_eq!(config.uploads.dir, "uploads");
        assert_eq!(config.uploads.max_bytes, 5 * 1024 * 1024);
        assert!(!config.app.is_development());
    }

    #[test]
    fn test_email_requires_host_and_credentials() {
        let mut email = EmailConfig {
            host: Some("smtp.example.com".to_string()),
            ..EmailConfig::default()
        };
        assert!(!email.is_configured());
        email.username = Some("mailer".to_string());
        email.password = Some("pw".to_string());
        assert!(email.is_configured());
    }

    #[test]
    fn test_development_flag_is_case_insensitive() {
        let app = AppConfig {
            environment: "Development".to_string(),
            ..AppConfig::default()
        };
        assert!(app.is_development());
    }
}
