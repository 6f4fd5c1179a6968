//! Notifier gateway configuration (e-mail and SMS delivery)

use serde::{Deserialize, Serialize};

use super::env_parse;

/// HTTP e-mail API settings
#[derive(Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Provider name ("http" or "mock")
    pub provider: String,
    /// Send endpoint of the mail API
    pub api_url: String,
    /// API token sent in the `api-key` header
    pub api_key: String,
    /// Sender address
    pub sender_email: String,
    /// Sender display name
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Client route receiving the token, e.g. `https://app.example.com/verification`
    pub verify_url: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Second mail API used while the primary is failing
    #[serde(default)]
    pub backup_api_url: Option<String>,
    /// API token for the backup mail API
    #[serde(default)]
    pub backup_api_key: Option<String>,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("sender_email", &self.sender_email)
            .field("sender_name", &self.sender_name)
            .field("verify_url", &self.verify_url)
            .field("backup_api_url", &self.backup_api_url)
            .finish()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: String::from("mock"),
            api_url: String::from("https://api.brevo.com/v3/smtp/email"),
            api_key: String::new(),
            sender_email: String::from("no-reply@localhost"),
            sender_name: None,
            verify_url: String::from("http://localhost:3000/verification"),
            request_timeout_secs: 10,
            backup_api_url: None,
            backup_api_key: None,
        }
    }
}

impl EmailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("EMAIL_PROVIDER").unwrap_or(defaults.provider),
            api_url: std::env::var("MAIL_API_URL").unwrap_or(defaults.api_url),
            api_key: std::env::var("MAIL_API_KEY").unwrap_or(defaults.api_key),
            sender_email: std::env::var("SENDER_EMAIL").unwrap_or(defaults.sender_email),
            sender_name: std::env::var("SENDER_NAME").ok(),
            verify_url: std::env::var("VERIFY_URL").unwrap_or(defaults.verify_url),
            request_timeout_secs: env_parse("MAIL_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            backup_api_url: std::env::var("MAIL_BACKUP_API_URL").ok(),
            backup_api_key: std::env::var("MAIL_BACKUP_API_KEY").ok(),
        }
    }
}

/// SMS provider settings
#[derive(Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Provider name ("twilio" or "mock")
    pub provider: String,
    /// Account identifier
    pub account_sid: String,
    /// Auth token
    pub auth_token: String,
    /// Sending number in E.164 format
    pub from_number: String,
}

impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("provider", &self.provider)
            .field("from_number", &self.from_number)
            .finish()
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: String::from("mock"),
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::from("+15005550006"),
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("SMS_PROVIDER").unwrap_or(defaults.provider),
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").unwrap_or(defaults.account_sid),
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").unwrap_or(defaults.auth_token),
            from_number: std::env::var("TWILIO_FROM_NUMBER").unwrap_or(defaults.from_number),
        }
    }
}

/// Delivery channel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// E-mail channel
    #[serde(default)]
    pub email: EmailConfig,
    /// SMS channel
    #[serde(default)]
    pub sms: SmsConfig,
    /// Seconds before a failed primary channel is tried again
    #[serde(default = "default_failover_timeout")]
    pub failover_timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            email: EmailConfig::default(),
            sms: SmsConfig::default(),
            failover_timeout_secs: default_failover_timeout(),
        }
    }
}

impl NotifierConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            email: EmailConfig::from_env(),
            sms: SmsConfig::from_env(),
            failover_timeout_secs: env_parse("NOTIFIER_FAILOVER_TIMEOUT_SECS", default_failover_timeout()),
        }
    }
}

fn default_failover_timeout() -> u64 {
    30
}
