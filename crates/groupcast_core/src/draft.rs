use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentKind {
    #[default]
    None,
    Audio,
    Document,
}

impl AttachmentKind {
    /// Value of the `fileType` form field.
    pub fn form_value(self) -> &'static str {
        match self {
            AttachmentKind::None => "",
            AttachmentKind::Audio => "audio",
            AttachmentKind::Document => "document",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(AttachmentKind::None),
            "audio" => Some(AttachmentKind::Audio),
            "document" | "doc" => Some(AttachmentKind::Document),
            _ => None,
        }
    }
}

/// File picked for the broadcast; content is passed through unchecked.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// Keep payload bytes out of debug output.
impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposeDraft {
    pub text: String,
    pub attachment: Option<Attachment>,
    pub attachment_kind: AttachmentKind,
}
