use crate::{BroadcastRequest, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenChannel { session_id: SessionId },
    SendBroadcast(BroadcastRequest),
    Alert(Alert),
}

/// Blocking, user-visible notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

impl Alert {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: AlertSeverity::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: AlertSeverity::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Info,
    Error,
}
