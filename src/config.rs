// src/config.rs

use dotenvy::dotenv;
use std::env;
use url::Url;

/// Verification codes expire this many minutes after issuance.
pub const CODE_TTL_MINUTES: i64 = 10;
/// A ticket is destroyed once this many verification attempts were spent.
pub const MAX_CODE_ATTEMPTS: u32 = 3;
/// Minimum display-name length, counted after trimming.
pub const MIN_NAME_LENGTH: usize = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub admin_email: String,
    pub allowed_emails: Vec<String>,
    pub email_domain: String,
    pub relay_url: Option<Url>,
    pub relay_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let data_dir = env::var("QUIZGATE_DATA_DIR").unwrap_or_else(|_| "data".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let admin_email = env::var("ADMIN_EMAIL")
            .expect("ADMIN_EMAIL must be set")
            .trim()
            .to_lowercase();

        // Comma-separated allow-list; entries are normalized once here so the
        // engine can compare exactly.
        let allowed_emails = env::var("ALLOWED_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        let email_domain = env::var("EMAIL_DOMAIN").unwrap_or_else(|_| "@gmail.com".to_string());

        let relay_url = env::var("EMAIL_RELAY_URL")
            .ok()
            .map(|raw| Url::parse(&raw).expect("EMAIL_RELAY_URL must be a valid URL"));

        let relay_timeout_secs = env::var("EMAIL_RELAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            data_dir,
            jwt_secret,
            jwt_expiration,
            admin_email,
            allowed_emails,
            email_domain,
            relay_url,
            relay_timeout_secs,
            rust_log,
        }
    }
}
