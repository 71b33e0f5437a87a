use thiserror::Error;

use crate::{Attachment, AttachmentKind, ChatId, ComposeDraft, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("select at least one chat")]
    EmptySelection,
    #[error("choose a file type for the attachment")]
    MissingAttachmentKind,
    #[error("backend rejected the broadcast{}", status_suffix(.status))]
    BackendRejected { status: Option<u16> },
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

/// Everything the backend needs for one `sendMessages` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRequest {
    pub session_id: SessionId,
    pub text: String,
    pub chats: Vec<ChatId>,
    pub file_type: AttachmentKind,
    pub file: Option<Attachment>,
}

impl BroadcastRequest {
    /// Text fields of the multipart body, in wire order. The `file` part is
    /// carried separately.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(self.chats.len() + 3);
        fields.push(("authId", self.session_id.as_str().to_string()));
        fields.push(("text", self.text.clone()));
        for chat in &self.chats {
            fields.push(("chats[]", chat.as_str().to_string()));
        }
        fields.push(("fileType", self.file_type.form_value().to_string()));
        fields
    }
}

/// Validates the draft against the selection; no request exists unless this succeeds.
pub fn prepare_broadcast(
    draft: &ComposeDraft,
    selected: &[ChatId],
    session_id: &SessionId,
) -> Result<BroadcastRequest, SubmitError> {
    if selected.is_empty() {
        return Err(SubmitError::EmptySelection);
    }
    if draft.attachment.is_some() && draft.attachment_kind == AttachmentKind::None {
        return Err(SubmitError::MissingAttachmentKind);
    }
    Ok(BroadcastRequest {
        session_id: session_id.clone(),
        text: draft.text.clone(),
        chats: selected.to_vec(),
        file_type: draft.attachment_kind,
        file: draft.attachment.clone(),
    })
}
