//! Groupcast core: session identity, chat selection and the pure update loop.
mod directory;
mod draft;
mod effect;
mod msg;
mod session;
mod state;
mod submit;
mod update;
mod view_model;

pub use directory::{Chat, ChatDirectory, ChatId};
pub use draft::{Attachment, AttachmentKind, ComposeDraft};
pub use effect::{Alert, AlertSeverity, Effect};
pub use msg::Msg;
pub use session::{IdentityStore, KeyValueStore, MemoryStore, SessionId, StorageError, SESSION_KEY};
pub use state::{AppState, ChannelStatus, Screen, Submission};
pub use submit::{prepare_broadcast, BroadcastRequest, SubmitError};
pub use update::{update, SUCCESS_MESSAGE};
pub use view_model::{AppViewModel, ChatRowView, ComposerView, ScreenView};
