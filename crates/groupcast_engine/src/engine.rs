use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use groupcast_logging::{cast_info, cast_warn};
use url::Url;

use crate::channel::{
    ChannelEventSink, ChannelSettings, EventSink, RealtimeChannel, SocketIoChannel,
};
use crate::submit::{ReqwestSubmitter, SubmitSettings, Submitter};
use crate::{BroadcastForm, ChannelEvent, EngineEvent, SubmitFailure};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub backend_url: Url,
    pub channel: ChannelSettings,
    pub submit: SubmitSettings,
}

impl EngineConfig {
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            channel: ChannelSettings::default(),
            submit: SubmitSettings::default(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.channel.connect_timeout = timeout;
        self.submit.connect_timeout = timeout;
        self
    }
}

enum EngineCommand {
    OpenChannel { session_id: String },
    Submit(BroadcastForm),
}

/// Command side of the engine. Dropping it stops the worker thread once
/// in-flight work has been spawned.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Event side of the engine, separable so it can be pumped from its own thread.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<(Self, EngineEvents), SubmitFailure> {
        let submitter = ReqwestSubmitter::new(&config.backend_url, config.submit.clone())?;
        let channel = SocketIoChannel::new(config.backend_url.clone(), config.channel.clone());
        Ok(Self::with_parts(Arc::new(channel), Arc::new(submitter)))
    }

    /// Builds an engine around explicit channel and submitter implementations.
    pub fn with_parts(
        channel: Arc<dyn RealtimeChannel>,
        submitter: Arc<dyn Submitter>,
    ) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let channel = channel.clone();
                let submitter = submitter.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(channel.as_ref(), submitter.as_ref(), command, event_tx).await;
                });
            }
            // Keep the runtime alive for tasks already spawned.
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        (Self { cmd_tx }, EngineEvents { event_rx })
    }

    pub fn open_channel(&self, session_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::OpenChannel {
            session_id: session_id.into(),
        });
    }

    pub fn submit(&self, form: BroadcastForm) {
        let _ = self.cmd_tx.send(EngineCommand::Submit(form));
    }
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the engine is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    channel: &dyn RealtimeChannel,
    submitter: &dyn Submitter,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::OpenChannel { session_id } => {
            let sink = ChannelEventSink::new(event_tx.clone());
            let reason = match channel.run(&session_id, &sink).await {
                Ok(()) => "closed by server".to_string(),
                Err(err) => {
                    cast_warn!("Realtime channel failed: {}", err);
                    err.to_string()
                }
            };
            sink.emit(EngineEvent::Channel(ChannelEvent::Disconnected { reason }));
        }
        EngineCommand::Submit(form) => {
            let result = submitter.submit(form).await;
            if let Err(failure) = &result {
                cast_info!("Broadcast failed: {} ({})", failure.kind, failure.message);
            }
            let _ = event_tx.send(EngineEvent::SubmitCompleted(result));
        }
    }
}
