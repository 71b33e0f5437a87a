use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use groupcast_logging::{cast_debug, cast_info, cast_warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::socketio::{self, Packet};
use crate::{ChannelEvent, EngineEvent, WireChat};

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub connect_timeout: Duration,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("connect timed out")]
    Timeout,
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server refused connection: {0}")]
    Refused(String),
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Push subscription keyed by the session id.
#[async_trait::async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Runs until the server ends the session. `Ok` means an orderly close.
    async fn run(&self, session_id: &str, sink: &dyn EventSink) -> Result<(), ChannelError>;
}

/// Socket.IO client over a single WebSocket, no reconnect.
#[derive(Debug, Clone)]
pub struct SocketIoChannel {
    base: Url,
    settings: ChannelSettings,
}

impl SocketIoChannel {
    pub fn new(base: Url, settings: ChannelSettings) -> Self {
        Self { base, settings }
    }
}

/// Builds `ws(s)://host[/base]/socket.io/?EIO=4&transport=websocket&authId=...`.
pub fn socket_url(base: &Url, session_id: &str) -> Result<Url, ChannelError> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(ChannelError::InvalidUrl(format!(
                "unsupported scheme {other}"
            )))
        }
    };
    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|_| ChannelError::InvalidUrl(base.to_string()))?;
    let path = format!("{}/socket.io/", base.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("EIO", "4")
        .append_pair("transport", "websocket")
        .append_pair("authId", session_id);
    Ok(url)
}

#[async_trait::async_trait]
impl RealtimeChannel for SocketIoChannel {
    async fn run(&self, session_id: &str, sink: &dyn EventSink) -> Result<(), ChannelError> {
        let url = socket_url(&self.base, session_id)?;
        let connect = tokio_tungstenite::connect_async(url.as_str());
        let (mut ws, _) = tokio::time::timeout(self.settings.connect_timeout, connect)
            .await
            .map_err(|_| ChannelError::Timeout)?
            .map_err(|err| ChannelError::Connect(err.to_string()))?;
        cast_info!("Realtime channel open to {}", self.base);

        while let Some(frame) = ws.next().await {
            let text = match frame.map_err(|err| ChannelError::Transport(err.to_string()))? {
                Message::Text(text) => text,
                Message::Close(_) => {
                    cast_info!("Realtime channel closed by server");
                    return Ok(());
                }
                _ => continue,
            };
            let packet = match socketio::decode_frame(&text) {
                Ok(packet) => packet,
                Err(err) => {
                    cast_warn!("Dropping undecodable frame: {}", err);
                    continue;
                }
            };
            match packet {
                Packet::Open(handshake) => {
                    cast_debug!("Engine.IO open {}", handshake);
                    send_text(&mut ws, socketio::CONNECT).await?;
                }
                Packet::Ping => send_text(&mut ws, socketio::PONG).await?,
                Packet::Connect { namespace: None } => {
                    sink.emit(EngineEvent::Channel(ChannelEvent::Connected));
                }
                Packet::Event {
                    namespace: None,
                    name,
                    args,
                } => {
                    if let Some(event) = decode_event(&name, args) {
                        sink.emit(EngineEvent::Channel(event));
                    }
                }
                Packet::ConnectError {
                    namespace: None,
                    message,
                } => return Err(ChannelError::Refused(message)),
                Packet::Close | Packet::Disconnect { namespace: None } => {
                    cast_info!("Realtime channel disconnected by server");
                    return Ok(());
                }
                other => cast_debug!("Ignoring packet {:?}", other),
            }
        }
        Ok(())
    }
}

async fn send_text<S>(ws: &mut S, text: &str) -> Result<(), ChannelError>
where
    S: futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    ws.send(Message::Text(text.to_string()))
        .await
        .map_err(|err| ChannelError::Transport(err.to_string()))
}

#[derive(Deserialize)]
struct QrPush {
    to: String,
    qr: String,
}

/// Maps a named push to a typed event. `qr` must be a `{to, qr}` object;
/// the bare-string form is rejected.
pub fn decode_event(name: &str, args: Vec<Value>) -> Option<ChannelEvent> {
    let first = args.into_iter().next();
    match name {
        "qr" => match first.map(serde_json::from_value::<QrPush>) {
            Some(Ok(push)) => Some(ChannelEvent::Qr {
                to: push.to,
                qr: push.qr,
            }),
            Some(Err(err)) => {
                cast_warn!("Dropping qr push with unexpected shape: {}", err);
                None
            }
            None => {
                cast_warn!("Dropping qr push without payload");
                None
            }
        },
        "chats" => match first {
            None | Some(Value::Null) => Some(ChannelEvent::Chats(None)),
            Some(value) => match serde_json::from_value::<Vec<WireChat>>(value) {
                Ok(chats) => Some(ChannelEvent::Chats(Some(chats))),
                Err(err) => {
                    cast_warn!("Dropping chats push with unexpected shape: {}", err);
                    None
                }
            },
        },
        other => {
            cast_debug!("Ignoring event {}", other);
            None
        }
    }
}
