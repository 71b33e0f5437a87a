use std::io::{self, Write};
use std::sync::mpsc;
use std::thread;

use groupcast_core::{Attachment, BroadcastRequest, Chat, Effect, Msg, SubmitError};
use groupcast_engine::{
    BroadcastForm, ChannelEvent, EngineEvent, EngineEvents, EngineHandle, FilePart,
};
use groupcast_logging::{cast_info, cast_warn};

use super::app::AppInput;
use super::ui::render;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Hands IO effects to the engine and writes alerts to `out`. Returns
    /// whether an alert was shown, which the caller must have acknowledged.
    pub fn run(&self, effects: Vec<Effect>, out: &mut impl Write) -> io::Result<bool> {
        let mut alerted = false;
        for effect in effects {
            match effect {
                Effect::OpenChannel { session_id } => {
                    cast_info!("OpenChannel session={}", session_id.redacted());
                    self.engine.open_channel(session_id.as_str());
                }
                Effect::SendBroadcast(request) => {
                    cast_info!(
                        "SendBroadcast chats={} file={}",
                        request.chats.len(),
                        request.file.is_some()
                    );
                    self.engine.submit(to_form(request));
                }
                Effect::Alert(alert) => {
                    writeln!(out, "{}", render::render_alert(&alert))?;
                    alerted = true;
                }
            }
        }
        out.flush()?;
        Ok(alerted)
    }
}

/// Forwards engine events into the dispatch queue until either side goes away.
pub fn spawn_event_pump(events: EngineEvents, input_tx: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if input_tx.send(AppInput::Engine(map_event(event))).is_err() {
                break;
            }
        }
    });
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Channel(ChannelEvent::Connected) => Msg::ChannelConnected,
        EngineEvent::Channel(ChannelEvent::Qr { to, qr }) => Msg::QrReceived { target: to, qr },
        EngineEvent::Channel(ChannelEvent::Chats(chats)) => Msg::ChatsReceived(chats.map(|list| {
            list.into_iter()
                .map(|chat| Chat::new(chat.id, chat.subject))
                .collect()
        })),
        EngineEvent::Channel(ChannelEvent::Disconnected { reason }) => {
            Msg::ChannelClosed { reason }
        }
        EngineEvent::SubmitCompleted(Ok(())) => Msg::SubmitFinished(Ok(())),
        EngineEvent::SubmitCompleted(Err(failure)) => {
            cast_warn!("Broadcast failed: {} ({})", failure.kind, failure.message);
            Msg::SubmitFinished(Err(SubmitError::BackendRejected {
                status: failure.status(),
            }))
        }
    }
}

pub fn to_form(request: BroadcastRequest) -> BroadcastForm {
    let fields = request
        .form_fields()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    BroadcastForm {
        fields,
        file: request.file.map(to_file_part),
    }
}

fn to_file_part(attachment: Attachment) -> FilePart {
    FilePart {
        file_name: attachment.file_name,
        content_type: attachment.content_type,
        bytes: attachment.bytes,
    }
}

pub fn to_attachment(part: FilePart) -> Attachment {
    Attachment {
        file_name: part.file_name,
        content_type: part.content_type,
        bytes: part.bytes,
    }
}
