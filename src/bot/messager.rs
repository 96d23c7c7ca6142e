use crate::bot::messenger::Messenger;
use crate::bot::update::{Inbound, Origin, classify, read_update};
use crate::core::services::expense_parser::{ParseFailure, parse_expense};
use crate::core::services::ledger::{ExpenseRecord, Ledger};
use crate::core::services::notifier::{Notifier, Source};
use crate::core::services::transcription::{AudioFile, Transcriber};
use crate::errors::MyError;
use log::{debug, info, warn};
use std::sync::Arc;
use teloxide::types::Update;

/// What became of one update. Everything here has already been answered in
/// the chat, where an answer was due.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored,
    Recorded(ExpenseRecord),
    NotUnderstood(ParseFailure),
    FileUnavailable,
    EmptyTranscription,
}

pub struct MessageRouter {
    messenger: Arc<dyn Messenger>,
    transcriber: Arc<dyn Transcriber>,
    ledger: Arc<dyn Ledger>,
    notifier: Notifier,
}

impl MessageRouter {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        transcriber: Arc<dyn Transcriber>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            notifier: Notifier::new(messenger.clone()),
            messenger,
            transcriber,
            ledger,
        }
    }

    pub async fn handle(&self, update: &Update) -> Result<Outcome, MyError> {
        self.dispatch(classify(update)).await
    }

    /// Same as `handle`, starting from the raw webhook body.
    pub async fn handle_body(&self, body: &[u8]) -> Result<Outcome, MyError> {
        self.dispatch(read_update(body)).await
    }

    async fn dispatch(&self, inbound: Inbound) -> Result<Outcome, MyError> {
        match inbound {
            Inbound::NoMessage => {
                debug!("Update carries no message");
                Ok(Outcome::Ignored)
            }
            Inbound::Unrecognized => {
                debug!("Message is neither text nor audio");
                Ok(Outcome::Ignored)
            }
            Inbound::Text { origin, text } => self.record(origin, Source::Text(&text)).await,
            Inbound::Voice { origin, file_id } | Inbound::Audio { origin, file_id } => {
                self.handle_audio(origin, &file_id).await
            }
        }
    }

    async fn handle_audio(&self, origin: Origin, file_id: &str) -> Result<Outcome, MyError> {
        let url = match self.messenger.resolve_file(file_id).await {
            Ok(url) => url,
            Err(MyError::FileResolution(_)) => {
                self.notifier.file_unavailable(origin).await?;
                return Ok(Outcome::FileUnavailable);
            }
            Err(e) => return Err(e),
        };

        let transcript = self.transcribe(&url).await?;
        if transcript.is_empty() {
            warn!("Empty transcription in chat {}", origin.chat_id);
            self.notifier.empty_transcription(origin).await?;
            return Ok(Outcome::EmptyTranscription);
        }

        self.record(origin, Source::Transcript(&transcript)).await
    }

    async fn transcribe(&self, url: &str) -> Result<String, MyError> {
        let data = self.messenger.download(url).await?;
        let audio = AudioFile::write(&data)?;
        let transcript = self.transcriber.transcribe(audio.path()).await;
        drop(audio);
        Ok(transcript?.trim().to_owned())
    }

    async fn record(&self, origin: Origin, source: Source<'_>) -> Result<Outcome, MyError> {
        let text = match source {
            Source::Text(text) | Source::Transcript(text) => text,
        };

        match parse_expense(text) {
            Ok(expense) => {
                let record = ExpenseRecord::new(expense, text);
                self.ledger.append(&record).await?;
                info!(
                    "Recorded {:.2} ({}) on {:?} for chat {}",
                    record.value, record.description, record.account, origin.chat_id
                );
                self.notifier.recorded(origin, &record, source).await?;
                Ok(Outcome::Recorded(record))
            }
            Err(failure) => {
                debug!("Could not parse {:?}: {}", text, failure);
                self.notifier.not_understood(origin, source).await?;
                Ok(Outcome::NotUnderstood(failure))
            }
        }
    }
}
