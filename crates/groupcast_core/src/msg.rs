use crate::{Attachment, AttachmentKind, Chat, ChatId, SessionId, SubmitError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Identity store produced the session id; opens the realtime channel.
    SessionEstablished(SessionId),
    /// Realtime channel completed its handshake.
    ChannelConnected,
    /// Realtime channel ended; no reconnect follows.
    ChannelClosed { reason: String },
    /// `qr` push. Applies only when `target` is our session id.
    QrReceived { target: String, qr: String },
    /// `chats` push. `None` is the backend's "no list" marker.
    ChatsReceived(Option<Vec<Chat>>),
    /// User edited the search box.
    FilterChanged(String),
    /// User ticked or unticked one chat.
    ChatToggled(ChatId),
    SelectAllVisibleClicked,
    DeselectAllVisibleClicked,
    /// Single select-all / deselect-all button.
    ToggleAllVisibleClicked,
    ClearSelectionClicked,
    /// User edited the message text.
    TextChanged(String),
    AttachmentChosen(Attachment),
    /// Picking an attachment failed before it reached the draft.
    AttachmentRejected { reason: String },
    AttachmentCleared,
    AttachmentKindChosen(AttachmentKind),
    SubmitClicked,
    /// Broadcast request finished.
    SubmitFinished(Result<(), SubmitError>),
}

impl Msg {
    /// User edits that only make sense while the composer is on screen.
    pub fn is_composer_action(&self) -> bool {
        matches!(
            self,
            Msg::FilterChanged(_)
                | Msg::ChatToggled(_)
                | Msg::SelectAllVisibleClicked
                | Msg::DeselectAllVisibleClicked
                | Msg::ToggleAllVisibleClicked
                | Msg::ClearSelectionClicked
                | Msg::TextChanged(_)
                | Msg::AttachmentChosen(_)
                | Msg::AttachmentCleared
                | Msg::AttachmentKindChosen(_)
                | Msg::SubmitClicked
        )
    }
}
