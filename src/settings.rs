use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use chrono_tz::Tz;
use std::{env, fmt, str::FromStr, time::Duration};

use crate::constants::{
    DEFAULT_MESSAGE_PREVIEW_CHARS, DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_MAX_CLIENTS,
    DEFAULT_RATE_LIMIT_WINDOW_SECS,
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

/// How the connection to the SMTP relay is secured.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS from the first byte (port 465)
    Tls,
    /// Plain connection upgraded with STARTTLS (port 587)
    StartTls,
    /// No encryption at all, local relays only
    None,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub trust_x_forwarded_for: bool,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default = "default_smtp_security")]
    pub smtp_security: SmtpSecurity,

    #[serde(default)]
    pub smtp_username: String,

    #[serde(default)]
    pub smtp_password: String,

    /// Sender address; falls back to `smtp_username` when empty
    #[serde(default)]
    pub mail_from: String,

    #[serde(default)]
    pub operator_inbox: String,

    #[serde(default = "default_true")]
    pub verify_transport: bool,

    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: usize,

    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    #[serde(default = "default_rate_limit_max_clients")]
    pub rate_limit_max_clients: usize,

    #[serde(default = "default_message_preview_chars")]
    pub message_preview_chars: usize,

    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,

    #[serde(default = "default_brand_name")]
    pub brand_name: String,

    #[serde(default = "default_brand_website")]
    pub brand_website: String,

    #[serde(default = "default_brand_tagline")]
    pub brand_tagline: String,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Contact-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_true() -> bool {
    true
}
fn default_smtp_host() -> String {
    "smtp.zoho.in".to_string()
}
fn default_smtp_port() -> u16 {
    465
}
fn default_smtp_security() -> SmtpSecurity {
    SmtpSecurity::Tls
}
fn default_rate_limit_max() -> usize {
    DEFAULT_RATE_LIMIT_MAX
}
fn default_rate_limit_window_secs() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_SECS
}
fn default_rate_limit_max_clients() -> usize {
    DEFAULT_RATE_LIMIT_MAX_CLIENTS
}
fn default_message_preview_chars() -> usize {
    DEFAULT_MESSAGE_PREVIEW_CHARS
}
fn default_display_timezone() -> String {
    "Asia/Kolkata".to_string()
}
fn default_brand_name() -> String {
    "AnantaChakra".to_string()
}
fn default_brand_website() -> String {
    "https://anantachakra.tech".to_string()
}
fn default_brand_tagline() -> String {
    "Let's Evolve & Revolve".to_string()
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        // Double underscore keeps snake_case keys like APP_SMTP_HOST flat
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.smtp_host.trim().is_empty() {
            errors.push("SMTP_HOST cannot be empty".to_string());
        }
        if self.smtp_username.trim().is_empty() {
            errors.push("SMTP_USERNAME must be set".to_string());
        }
        if self.smtp_password.is_empty() {
            errors.push("SMTP_PASSWORD must be set".to_string());
        }
        if !self.operator_inbox.contains('@') {
            errors.push("OPERATOR_INBOX must be an email address".to_string());
        }
        if self.display_timezone.parse::<Tz>().is_err() {
            errors.push(format!("Unknown DISPLAY_TIMEZONE: {}", self.display_timezone));
        }
        if self.rate_limit_max == 0 {
            errors.push("RATE_LIMIT_MAX must be greater than 0".to_string());
        }
        if self.rate_limit_window_secs == 0 {
            errors.push("RATE_LIMIT_WINDOW_SECS must be greater than 0".to_string());
        }
        if self.rate_limit_max_clients == 0 {
            errors.push("RATE_LIMIT_MAX_CLIENTS must be greater than 0".to_string());
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Address every outgoing message is sent from.
    pub fn sender_address(&self) -> &str {
        if self.mail_from.trim().is_empty() {
            self.smtp_username.trim()
        } else {
            self.mail_from.trim()
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn timezone(&self) -> Tz {
        self.display_timezone.parse().unwrap_or(chrono_tz::Asia::Kolkata)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("trust_x_forwarded_for", &self.trust_x_forwarded_for)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_security", &self.smtp_security)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.redact())
            .field("mail_from", &self.sender_address())
            .field("operator_inbox", &self.operator_inbox)
            .field("verify_transport", &self.verify_transport)
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("rate_limit_max_clients", &self.rate_limit_max_clients)
            .field("message_preview_chars", &self.message_preview_chars)
            .field("display_timezone", &self.display_timezone)
            .field("brand_name", &self.brand_name)
            .finish()
    }
}
