use crate::core::services::google_auth::ServiceAccountKey;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dotenv::dotenv;
use thiserror::Error;
use url::Url;

pub const DEFAULT_WORKSHEET_NAME: &str = "Gastos";
pub const DEFAULT_STT_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
pub const DEFAULT_STT_MODEL: &str = "whisper-1";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} expected")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("GOOGLE_SA_JSON_B64 is not a usable service account: {0}")]
    Credential(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    bot_token: String,
    sheet_id: String,
    worksheet_name: String,
    service_account: ServiceAccountKey,
    stt_api_url: String,
    stt_api_key: Option<String>,
    stt_model: String,
    port: u16,
    webhook_url: Option<Url>,
    log_chat_id: Option<i64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Values are trimmed and an
    /// empty value is treated the same as an absent one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let bot_token = require("TELEGRAM_BOT_TOKEN")?;
        let sheet_id = require("SHEET_ID")?;
        let worksheet_name =
            get("WORKSHEET_NAME").unwrap_or_else(|| DEFAULT_WORKSHEET_NAME.to_owned());
        let service_account = decode_service_account(&require("GOOGLE_SA_JSON_B64")?)?;

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let webhook_url = get("WEBHOOK_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    key: "WEBHOOK_URL",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let log_chat_id = get("LOG_CHAT_ID")
            .map(|raw| {
                raw.parse::<i64>().map_err(|e| ConfigError::Invalid {
                    key: "LOG_CHAT_ID",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Config {
            bot_token,
            sheet_id,
            worksheet_name,
            service_account,
            stt_api_url: get("STT_API_URL").unwrap_or_else(|| DEFAULT_STT_API_URL.to_owned()),
            stt_api_key: get("STT_API_KEY"),
            stt_model: get("STT_MODEL").unwrap_or_else(|| DEFAULT_STT_MODEL.to_owned()),
            port,
            webhook_url,
            log_chat_id,
        })
    }

    pub fn get_bot_token(&self) -> &str {
        &self.bot_token
    }

    pub fn get_sheet_id(&self) -> &str {
        &self.sheet_id
    }

    pub fn get_worksheet_name(&self) -> &str {
        &self.worksheet_name
    }

    pub fn get_service_account(&self) -> &ServiceAccountKey {
        &self.service_account
    }

    pub fn get_stt_api_url(&self) -> &str {
        &self.stt_api_url
    }

    pub fn get_stt_api_key(&self) -> Option<&str> {
        self.stt_api_key.as_deref()
    }

    pub fn get_stt_model(&self) -> &str {
        &self.stt_model
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_webhook_url(&self) -> Option<&Url> {
        self.webhook_url.as_ref()
    }

    pub fn get_log_chat_id(&self) -> Option<i64> {
        self.log_chat_id
    }
}

fn decode_service_account(blob: &str) -> Result<ServiceAccountKey, ConfigError> {
    // pasted blobs often carry line breaks
    let compact: String = blob.split_whitespace().collect();
    let raw = STANDARD
        .decode(compact)
        .map_err(|e| ConfigError::Credential(e.to_string()))?;
    let json = String::from_utf8(raw).map_err(|e| ConfigError::Credential(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| ConfigError::Credential(e.to_string()))
}
