//! Minimal Socket.IO v5 / Engine.IO v4 frame codec for the WebSocket transport.
//!
//! Only text frames are understood. Binary events and acks decode to
//! [`Packet::Unsupported`] so the caller can skip them.

use serde_json::Value;
use thiserror::Error;

/// Engine.IO pong, sent in answer to every ping.
pub const PONG: &str = "3";
/// Socket.IO CONNECT for the default namespace.
pub const CONNECT: &str = "40";

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Engine.IO handshake; payload is the raw JSON.
    Open(String),
    Close,
    Ping,
    Pong,
    Noop,
    Connect { namespace: Option<String> },
    Disconnect { namespace: Option<String> },
    ConnectError { namespace: Option<String>, message: String },
    Event {
        namespace: Option<String>,
        name: String,
        args: Vec<Value>,
    },
    Unsupported(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("empty frame")]
    Empty,
    #[error("unknown packet type {0:?}")]
    UnknownType(char),
    #[error("malformed event payload: {0}")]
    BadEvent(String),
}

pub fn decode_frame(frame: &str) -> Result<Packet, ProtocolError> {
    let (kind, rest) = split_type(frame)?;
    match kind {
        '0' => Ok(Packet::Open(rest.to_string())),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_message(rest),
        '5' => Ok(Packet::Unsupported(frame.to_string())),
        '6' => Ok(Packet::Noop),
        other => Err(ProtocolError::UnknownType(other)),
    }
}

fn decode_message(body: &str) -> Result<Packet, ProtocolError> {
    let (kind, rest) = split_type(body)?;
    let (namespace, rest) = split_namespace(rest);
    match kind {
        '0' => Ok(Packet::Connect { namespace }),
        '1' => Ok(Packet::Disconnect { namespace }),
        '2' => {
            // Optional ack id precedes the JSON array.
            let payload = rest.trim_start_matches(|c: char| c.is_ascii_digit());
            let (name, args) = decode_event(payload)?;
            Ok(Packet::Event {
                namespace,
                name,
                args,
            })
        }
        '4' => Ok(Packet::ConnectError {
            namespace,
            message: connect_error_message(rest),
        }),
        '3' | '5' | '6' => Ok(Packet::Unsupported(format!("4{body}"))),
        other => Err(ProtocolError::UnknownType(other)),
    }
}

fn split_type(frame: &str) -> Result<(char, &str), ProtocolError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(ProtocolError::Empty)?;
    Ok((kind, chars.as_str()))
}

fn split_namespace(rest: &str) -> (Option<String>, &str) {
    if !rest.starts_with('/') {
        return (None, rest);
    }
    match rest.find(',') {
        Some(idx) => (Some(rest[..idx].to_string()), &rest[idx + 1..]),
        None => (Some(rest.to_string()), ""),
    }
}

fn decode_event(payload: &str) -> Result<(String, Vec<Value>), ProtocolError> {
    let mut items: Vec<Value> =
        serde_json::from_str(payload).map_err(|err| ProtocolError::BadEvent(err.to_string()))?;
    if items.is_empty() {
        return Err(ProtocolError::BadEvent("missing event name".to_string()));
    }
    match items.remove(0) {
        Value::String(name) => Ok((name, items)),
        other => Err(ProtocolError::BadEvent(format!(
            "event name must be a string, got {other}"
        ))),
    }
}

fn connect_error_message(rest: &str) -> String {
    match serde_json::from_str::<Value>(rest) {
        Ok(Value::Object(obj)) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| rest.to_string()),
        Ok(Value::String(message)) => message,
        _ => rest.to_string(),
    }
}
