use async_trait::async_trait;
use bytes::Bytes;
use gastos_bot::bot::messager::MessageRouter;
use gastos_bot::bot::messenger::Messenger;
use gastos_bot::core::services::ledger::{ExpenseRecord, Ledger};
use gastos_bot::core::services::transcription::Transcriber;
use gastos_bot::errors::MyError;
use serde_json::{Value, json};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use teloxide::types::Update;

pub const CHAT_ID: i64 = 42;
pub const MESSAGE_ID: i32 = 7;
pub const VOICE_BYTES: &[u8] = b"OggS\x00\x02fake-voice";

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub reply_to: Option<i32>,
}

/// Telegram stand-in. `file_url: None` makes getFile refuse every file.
pub struct FakeMessenger {
    pub file_url: Option<String>,
    pub fail_download: bool,
    pub fail_sends: bool,
    pub resolved: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<SentMessage>>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self {
            file_url: Some("https://files.test/voice/file_0.oga".to_owned()),
            fail_download: false,
            fail_sends: false,
            resolved: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn refusing_files() -> Self {
        Self {
            file_url: None,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn resolve_file(&self, file_id: &str) -> Result<String, MyError> {
        self.resolved.lock().unwrap().push(file_id.to_owned());
        self.file_url
            .clone()
            .ok_or_else(|| MyError::FileResolution(file_id.to_owned()))
    }

    async fn download(&self, _url: &str) -> Result<Bytes, MyError> {
        if self.fail_download {
            return Err(MyError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "download failed",
            )));
        }
        Ok(Bytes::from_static(VOICE_BYTES))
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i32>,
    ) -> Result<(), MyError> {
        if self.fail_sends {
            return Err(MyError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "send failed",
            )));
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_owned(),
            reply_to,
        });
        Ok(())
    }
}

/// What the transcriber saw when it was called.
#[derive(Debug, Clone)]
pub struct TranscriptionCall {
    pub path: PathBuf,
    pub existed: bool,
    pub contents: Vec<u8>,
}

pub struct FakeTranscriber {
    pub reply: Result<String, String>,
    pub calls: Mutex<Vec<TranscriptionCall>>,
}

impl FakeTranscriber {
    pub fn saying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_owned()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_owned()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<TranscriptionCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, MyError> {
        self.calls.lock().unwrap().push(TranscriptionCall {
            path: audio.to_path_buf(),
            existed: audio.exists(),
            contents: std::fs::read(audio).unwrap_or_default(),
        });
        self.reply.clone().map_err(MyError::Transcription)
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    pub fail: bool,
    pub rows: Mutex<Vec<ExpenseRecord>>,
}

impl MemoryLedger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<ExpenseRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn append(&self, record: &ExpenseRecord) -> Result<(), MyError> {
        if self.fail {
            return Err(MyError::Ledger("quota exceeded".to_owned()));
        }
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct Harness {
    pub messenger: Arc<FakeMessenger>,
    pub transcriber: Arc<FakeTranscriber>,
    pub ledger: Arc<MemoryLedger>,
    pub router: Arc<MessageRouter>,
}

impl Harness {
    pub fn new(messenger: FakeMessenger, transcriber: FakeTranscriber, ledger: MemoryLedger) -> Self {
        let messenger = Arc::new(messenger);
        let transcriber = Arc::new(transcriber);
        let ledger = Arc::new(ledger);
        let router = Arc::new(MessageRouter::new(
            messenger.clone(),
            transcriber.clone(),
            ledger.clone(),
        ));
        Self {
            messenger,
            transcriber,
            ledger,
            router,
        }
    }

    pub fn default_with(transcript: &str) -> Self {
        Self::new(
            FakeMessenger::new(),
            FakeTranscriber::saying(transcript),
            MemoryLedger::default(),
        )
    }
}

pub fn message(fields: Value) -> Value {
    let mut message = json!({
        "message_id": MESSAGE_ID,
        "date": 1_760_000_000,
        "chat": { "id": CHAT_ID, "type": "private", "first_name": "Ana" },
        "from": { "id": CHAT_ID, "is_bot": false, "first_name": "Ana" }
    });
    if let (Some(target), Some(extra)) = (message.as_object_mut(), fields.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    json!({ "update_id": 1001, "message": message })
}

pub fn update(value: Value) -> Update {
    // teloxide's Update falls back to UpdateKind::Error when read via
    // from_value, so go through the wire form like the webhook does.
    serde_json::from_str(&value.to_string()).unwrap()
}

pub fn text_update(text: &str) -> Update {
    update(message(json!({ "text": text })))
}

pub fn voice_update(file_id: &str) -> Update {
    update(message(json!({
        "voice": { "file_id": file_id, "file_unique_id": "u1", "duration": 2, "mime_type": "audio/ogg" }
    })))
}

pub fn audio_update(file_id: &str) -> Update {
    update(message(json!({
        "audio": { "file_id": file_id, "file_unique_id": "u2", "duration": 5, "mime_type": "audio/mpeg" }
    })))
}
