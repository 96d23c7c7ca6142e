use crate::errors::MyError;
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, warn};
use std::time::Duration;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::{Request, Requester};
use teloxide::types::{ChatId, FileId, MessageId, ParseMode, ReplyParameters};
use teloxide::{Bot, RequestError};
use url::Url;

/// The messaging platform as the bot uses it.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Download URL for an uploaded file. An `Err(MyError::FileResolution)`
    /// means the platform refused to hand the file out.
    async fn resolve_file(&self, file_id: &str) -> Result<String, MyError>;

    async fn download(&self, url: &str) -> Result<Bytes, MyError>;

    /// Sends an HTML formatted message, optionally as a reply.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i32>,
    ) -> Result<(), MyError>;
}

pub struct TelegramMessenger {
    bot: Bot,
    client: reqwest::Client,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Result<Self, MyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { bot, client })
    }

    pub async fn register_webhook(&self, url: Url) -> Result<(), MyError> {
        self.bot.set_webhook(url).send().await?;
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn resolve_file(&self, file_id: &str) -> Result<String, MyError> {
        let file = match self.bot.get_file(FileId(file_id.to_owned())).send().await {
            Ok(file) => file,
            Err(RequestError::Api(api_error)) => {
                warn!("getFile refused {}: {}", file_id, api_error);
                return Err(MyError::FileResolution(file_id.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Resolved {} to {}", file_id, file.path);
        Ok(format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        ))
    }

    async fn download(&self, url: &str) -> Result<Bytes, MyError> {
        // the url embeds the bot token, keep it out of errors and logs
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(reqwest::Error::without_url)?;
        Ok(response.bytes().await.map_err(reqwest::Error::without_url)?)
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i32>,
    ) -> Result<(), MyError> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html);
        if let Some(message_id) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(message_id)));
        }
        request.send().await?;
        Ok(())
    }
}
