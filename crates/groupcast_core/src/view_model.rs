use crate::{AttachmentKind, ChannelStatus, ChatId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub screen: ScreenView,
    pub channel: ChannelStatus,
    /// Redacted session id, once established.
    pub session: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScreenView {
    #[default]
    Loading,
    Linking { qr: String },
    Composing(ComposerView),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerView {
    pub filter: String,
    pub rows: Vec<ChatRowView>,
    pub total_chats: usize,
    /// Includes selected ids that are filtered out or no longer listed.
    pub selected_count: usize,
    pub all_visible_selected: bool,
    pub text: String,
    pub attachment_name: Option<String>,
    pub attachment_kind: AttachmentKind,
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRowView {
    pub id: ChatId,
    pub subject: String,
    pub selected: bool,
}
