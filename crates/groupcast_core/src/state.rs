use crate::view_model::{AppViewModel, ChatRowView, ComposerView, ScreenView};
use crate::{
    prepare_broadcast, Attachment, AttachmentKind, BroadcastRequest, Chat, ChatDirectory,
    ChatId, ComposeDraft, SessionId, SubmitError,
};

/// The one active screen. Replaces loading/qr flags so only one can hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Loading,
    Linking { qr: String },
    Composing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Submission {
    #[default]
    Idle,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelStatus {
    #[default]
    Idle,
    Connecting,
    Connected,
    Closed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session_id: Option<SessionId>,
    screen: Screen,
    channel: ChannelStatus,
    directory: ChatDirectory,
    draft: ComposeDraft,
    submission: Submission,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let screen = match &self.screen {
            Screen::Loading => ScreenView::Loading,
            Screen::Linking { qr } => ScreenView::Linking { qr: qr.clone() },
            Screen::Composing => ScreenView::Composing(self.composer_view()),
        };
        AppViewModel {
            screen,
            channel: self.channel.clone(),
            session: self.session_id.as_ref().map(SessionId::redacted),
            dirty: self.dirty,
        }
    }

    fn composer_view(&self) -> ComposerView {
        let rows = self
            .directory
            .visible()
            .into_iter()
            .map(|chat| ChatRowView {
                id: chat.id.clone(),
                subject: chat.subject.clone(),
                selected: self.directory.is_selected(&chat.id),
            })
            .collect();
        ComposerView {
            filter: self.directory.filter_query().to_string(),
            rows,
            total_chats: self.directory.all_chats().len(),
            selected_count: self.directory.selected().len(),
            all_visible_selected: self.directory.all_visible_selected(),
            text: self.draft.text.clone(),
            attachment_name: self.draft.attachment.as_ref().map(|a| a.file_name.clone()),
            attachment_kind: self.draft.attachment_kind,
            busy: self.submission == Submission::InFlight,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn directory(&self) -> &ChatDirectory {
        &self.directory
    }

    pub fn draft(&self) -> &ComposeDraft {
        &self.draft
    }

    pub fn is_composing(&self) -> bool {
        self.screen == Screen::Composing
    }

    pub fn submission(&self) -> Submission {
        self.submission
    }

    /// Returns whether a render is due and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns false if a session was already established.
    pub(crate) fn establish_session(&mut self, id: SessionId) -> bool {
        if self.session_id.is_some() {
            return false;
        }
        self.session_id = Some(id);
        self.channel = ChannelStatus::Connecting;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_channel(&mut self, status: ChannelStatus) {
        self.channel = status;
        self.mark_dirty();
    }

    /// Returns false when the QR is addressed to another session.
    pub(crate) fn apply_qr(&mut self, target: &str, qr: String) -> bool {
        match &self.session_id {
            Some(id) if id.as_str() == target => {
                self.screen = Screen::Linking { qr };
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn apply_chats(&mut self, chats: Option<Vec<Chat>>) {
        if let Some(chats) = chats {
            self.directory.set_chats(chats);
        }
        self.screen = Screen::Composing;
        self.mark_dirty();
    }

    pub(crate) fn directory_mut(&mut self) -> &mut ChatDirectory {
        self.mark_dirty();
        &mut self.directory
    }

    pub(crate) fn toggle_chat(&mut self, id: &ChatId) {
        self.directory_mut().toggle_select(id);
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.draft.text = text;
        self.mark_dirty();
    }

    pub(crate) fn set_attachment(&mut self, attachment: Option<Attachment>) {
        self.draft.attachment = attachment;
        self.mark_dirty();
    }

    pub(crate) fn set_attachment_kind(&mut self, kind: AttachmentKind) {
        self.draft.attachment_kind = kind;
        self.mark_dirty();
    }

    /// Validates and marks the submission in flight. `Ok(None)` means a
    /// submission is already outstanding or the composer is not on screen.
    pub(crate) fn begin_submit(&mut self) -> Result<Option<BroadcastRequest>, SubmitError> {
        if !self.is_composing() || self.submission == Submission::InFlight {
            return Ok(None);
        }
        let Some(session_id) = self.session_id.as_ref() else {
            return Ok(None);
        };
        let request = prepare_broadcast(&self.draft, self.directory.selected(), session_id)?;
        self.submission = Submission::InFlight;
        self.mark_dirty();
        Ok(Some(request))
    }

    pub(crate) fn finish_submit(&mut self) {
        self.submission = Submission::Idle;
        self.mark_dirty();
    }
}
