//! Groupcast engine: realtime channel, broadcast submission and file IO.
mod attachment;
mod channel;
mod engine;
mod persist;
pub mod socketio;
mod submit;
mod types;

pub use attachment::{content_type_for, load_attachment, AttachmentError};
pub use channel::{
    decode_event, socket_url, ChannelError, ChannelEventSink, ChannelSettings, EventSink,
    RealtimeChannel, SocketIoChannel,
};
pub use engine::{EngineConfig, EngineEvents, EngineHandle};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use submit::{endpoint_url, ReqwestSubmitter, SubmitSettings, Submitter, SEND_MESSAGES_PATH};
pub use types::{
    BroadcastForm, ChannelEvent, EngineEvent, FailureKind, FilePart, SubmitFailure, WireChat,
};
