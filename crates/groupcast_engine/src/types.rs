use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Channel(ChannelEvent),
    SubmitCompleted(Result<(), SubmitFailure>),
}

/// Typed view of the backend's push stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Connected,
    Qr { to: String, qr: String },
    /// `None` is the backend's null marker.
    Chats(Option<Vec<WireChat>>),
    Disconnected { reason: String },
}

/// Chat as sent by the backend. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireChat {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WireChat {
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            extra: Map::new(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "chat id must be a string or number, got {other}"
        ))),
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Multipart body for one broadcast: ordered text fields plus an optional file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BroadcastForm {
    pub fields: Vec<(String, String)>,
    pub file: Option<FilePart>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SubmitFailure {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidFile,
    HttpStatus(u16),
    Timeout,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidFile => write!(f, "invalid file part"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
