use log::debug;
use teloxide::types::{Message, Update, UpdateKind};

/// Chat and message a reply should point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub chat_id: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    NoMessage,
    Text { origin: Origin, text: String },
    Voice { origin: Origin, file_id: String },
    Audio { origin: Origin, file_id: String },
    Unrecognized,
}

/// Reads a webhook body. Anything that is not a Telegram update counts as an
/// update without a message.
pub fn read_update(body: &[u8]) -> Inbound {
    match serde_json::from_slice::<Update>(body) {
        Ok(update) => classify(&update),
        Err(e) => {
            debug!("Unreadable update body: {}", e);
            Inbound::NoMessage
        }
    }
}

pub fn classify(update: &Update) -> Inbound {
    match &update.kind {
        UpdateKind::Message(message) | UpdateKind::EditedMessage(message) => {
            classify_message(message)
        }
        _ => Inbound::NoMessage,
    }
}

/// Voice wins over audio, audio over text. Text is trimmed and blank text is
/// not worth answering.
fn classify_message(message: &Message) -> Inbound {
    let origin = Origin {
        chat_id: message.chat.id.0,
        message_id: message.id.0,
    };

    if let Some(voice) = message.voice() {
        return Inbound::Voice {
            origin,
            file_id: voice.file.id.0.to_owned(),
        };
    }
    if let Some(audio) = message.audio() {
        return Inbound::Audio {
            origin,
            file_id: audio.file.id.0.to_owned(),
        };
    }

    match message.text().map(str::trim) {
        Some(text) if !text.is_empty() => Inbound::Text {
            origin,
            text: text.to_owned(),
        },
        _ => Inbound::Unrecognized,
    }
}
