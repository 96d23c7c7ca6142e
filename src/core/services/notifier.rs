use crate::bot::messenger::Messenger;
use crate::bot::update::Origin;
use crate::core::services::ledger::ExpenseRecord;
use crate::errors::MyError;
use std::sync::Arc;
use teloxide::utils::html;

pub const USAGE_EXAMPLE: &str = "500 padaria nubank";
pub const FILE_UNAVAILABLE: &str = "Não consegui pegar o áudio 😕";
pub const EMPTY_TRANSCRIPTION: &str =
    "Transcrevi vazio 😅 Tenta falar um pouco mais alto e sem muito ruído.";

/// Where the text that was parsed came from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Text(&'a str),
    Transcript(&'a str),
}

impl Source<'_> {
    fn header(&self) -> String {
        match self {
            Source::Text(text) => format!("Texto: <code>{}</code>", html::escape(text)),
            Source::Transcript(text) => format!("Transcrição: <code>{}</code>", html::escape(text)),
        }
    }
}

/// Brazilian rendering of an amount: two decimals, decimal comma.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

pub fn recorded_text(record: &ExpenseRecord, source: Source<'_>) -> String {
    let line = format!(
        "Lançado ✅ R$ <b>{}</b> | {} | {}",
        format_amount(record.value),
        html::escape(&record.description),
        html::escape(&record.account)
    );
    match source {
        Source::Text(_) => line,
        Source::Transcript(_) => format!("{}\n{}", source.header(), line),
    }
}

pub fn not_understood_text(source: Source<'_>) -> String {
    format!(
        "{}\nNão entendi o formato. Exemplo: <code>{}</code>",
        source.header(),
        USAGE_EXAMPLE
    )
}

/// Sends the outcome of a message back as a reply to it.
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    pub async fn recorded(
        &self,
        origin: Origin,
        record: &ExpenseRecord,
        source: Source<'_>,
    ) -> Result<(), MyError> {
        self.reply(origin, recorded_text(record, source)).await
    }

    pub async fn not_understood(&self, origin: Origin, source: Source<'_>) -> Result<(), MyError> {
        self.reply(origin, not_understood_text(source)).await
    }

    pub async fn file_unavailable(&self, origin: Origin) -> Result<(), MyError> {
        self.reply(origin, FILE_UNAVAILABLE.to_owned()).await
    }

    pub async fn empty_transcription(&self, origin: Origin) -> Result<(), MyError> {
        self.reply(origin, EMPTY_TRANSCRIPTION.to_owned()).await
    }

    async fn reply(&self, origin: Origin, text: String) -> Result<(), MyError> {
        self.messenger
            .send_message(origin.chat_id, &text, Some(origin.message_id))
            .await
    }
}
