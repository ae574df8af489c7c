use std::net::IpAddr;
use std::path::PathBuf;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub require_database: bool,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub allowed_origins: Vec<String>,
    pub log_level: String,
    pub error_log: Option<PathBuf>,
    pub state_backend: StateBackend,
    pub rate_limit: RateLimitConfig,
    pub session_ttl_secs: u64,
    pub secure_cookies: bool,
    pub honeypot_field: Option<String>,
    pub site: SiteConfig,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StateBackend {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_submissions: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: 5,
            window_secs: 3600,
        }
    }
}

/// Branding and addressing used when rendering notification mail.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub name: String,
    pub admin_email: String,
    pub mail_from: String,
    pub office_phones: Vec<OfficePhone>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfficePhone {
    pub label: String,
    pub number: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub tls: TlsMode,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TlsMode {
    StartTls,
    Tls,
    None,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("FORMDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORMDESK_HOST: {e}"))?;

        let port: u16 = env_or("FORMDESK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid FORMDESK_PORT: {e}"))?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let require_database = parse_bool("FORMDESK_REQUIRE_DATABASE", false)?;

        let max_body_size: usize = env_or("FORMDESK_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid FORMDESK_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("FORMDESK_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid FORMDESK_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let allowed_origins: Vec<String> = env_or("FORMDESK_ALLOWED_ORIGINS", "")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_level = env_or("FORMDESK_LOG_LEVEL", "info");

        let error_log = Some(env_or("FORMDESK_ERROR_LOG", "logs/form-errors.log"))
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let state_backend = match env_or("FORMDESK_STATE_BACKEND", "file").as_str() {
            "memory" => StateBackend::Memory,
            "file" => StateBackend::File(PathBuf::from(env_or("FORMDESK_STATE_DIR", "cache"))),
            other => return Err(format!("Invalid FORMDESK_STATE_BACKEND: {other}")),
        };

        let rate_limit = RateLimitConfig {
            max_submissions: env_or("FORMDESK_RATE_LIMIT", "5")
                .parse()
                .map_err(|e| format!("Invalid FORMDESK_RATE_LIMIT: {e}"))?,
            window_secs: env_or("FORMDESK_RATE_WINDOW_SECS", "3600")
                .parse()
                .map_err(|e| format!("Invalid FORMDESK_RATE_WINDOW_SECS: {e}"))?,
        };

        let session_ttl_secs: u64 = env_or("FORMDESK_SESSION_TTL_SECS", "7200")
            .parse()
            .map_err(|e| format!("Invalid FORMDESK_SESSION_TTL_SECS: {e}"))?;

        let secure_cookies = parse_bool("FORMDESK_SECURE_COOKIES", true)?;

        let honeypot_field = std::env::var("FORMDESK_HONEYPOT_FIELD")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let site = SiteConfig {
            name: env_required("FORMDESK_SITE_NAME")?,
            admin_email: env_required("FORMDESK_ADMIN_EMAIL")?,
            mail_from: env_required("FORMDESK_MAIL_FROM")?,
            office_phones: parse_office_phones(&env_or("FORMDESK_OFFICE_PHONES", ""))?,
        };

        let smtp = match (
            std::env::var("FORMDESK_SMTP_HOST").ok(),
            std::env::var("FORMDESK_SMTP_PORT").ok(),
            std::env::var("FORMDESK_SMTP_USER").ok(),
            std::env::var("FORMDESK_SMTP_PASS").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid FORMDESK_SMTP_PORT: {e}"))?,
                user,
                pass,
                tls: match env_or("FORMDESK_SMTP_TLS", "starttls").as_str() {
                    "tls" => TlsMode::Tls,
                    "none" => TlsMode::None,
                    "starttls" => TlsMode::StartTls,
                    other => return Err(format!("Invalid FORMDESK_SMTP_TLS: {other}")),
                },
                timeout_secs: env_or("FORMDESK_SMTP_TIMEOUT_SECS", "30")
                    .parse()
                    .map_err(|e| format!("Invalid FORMDESK_SMTP_TIMEOUT_SECS: {e}"))?,
            }),
            _ => None,
        };

        Ok(Config {
            host,
            port,
            database_url,
            require_database,
            max_body_size,
            trusted_proxies,
            allowed_origins,
            log_level,
            error_log,
            state_backend,
            rate_limit,
            session_ttl_secs,
            secure_cookies,
            honeypot_field,
            site,
            smtp,
        })
    }
}

/// Parse `Label=Number` pairs separated by commas.
pub fn parse_office_phones(raw: &str) -> Result<Vec<OfficePhone>, String> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|entry| {
            let (label, number) = entry
                .split_once('=')
                .ok_or_else(|| format!("Invalid FORMDESK_OFFICE_PHONES entry '{entry}'"))?;
            Ok(OfficePhone {
                label: label.trim().to_string(),
                number: number.trim().to_string(),
            })
        })
        .collect()
}

fn parse_bool(key: &str, default: bool) -> Result<bool, String> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("Invalid {key}: expected true or false")),
        },
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
