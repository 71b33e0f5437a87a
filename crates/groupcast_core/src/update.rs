use crate::{Alert, AppState, ChannelStatus, Effect, Msg, SubmitError};

pub const SUCCESS_MESSAGE: &str = "Messages sent successfully.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    // Loading and linking screens replace the composer entirely.
    if msg.is_composer_action() && !state.is_composing() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::SessionEstablished(session_id) => {
            if state.establish_session(session_id.clone()) {
                vec![Effect::OpenChannel { session_id }]
            } else {
                Vec::new()
            }
        }
        Msg::ChannelConnected => {
            state.set_channel(ChannelStatus::Connected);
            Vec::new()
        }
        Msg::ChannelClosed { reason } => {
            // Screen stays as is; a channel that never delivered leaves us loading.
            state.set_channel(ChannelStatus::Closed { reason });
            Vec::new()
        }
        Msg::QrReceived { target, qr } => {
            state.apply_qr(&target, qr);
            Vec::new()
        }
        Msg::ChatsReceived(chats) => {
            state.apply_chats(chats);
            Vec::new()
        }
        Msg::FilterChanged(query) => {
            state.directory_mut().set_filter(query);
            Vec::new()
        }
        Msg::ChatToggled(id) => {
            state.toggle_chat(&id);
            Vec::new()
        }
        Msg::SelectAllVisibleClicked => {
            state.directory_mut().select_all_visible();
            Vec::new()
        }
        Msg::DeselectAllVisibleClicked => {
            state.directory_mut().deselect_all_visible();
            Vec::new()
        }
        Msg::ToggleAllVisibleClicked => {
            state.directory_mut().toggle_all_visible();
            Vec::new()
        }
        Msg::ClearSelectionClicked => {
            state.directory_mut().clear_all_selected();
            Vec::new()
        }
        Msg::TextChanged(text) => {
            state.set_text(text);
            Vec::new()
        }
        Msg::AttachmentChosen(attachment) => {
            state.set_attachment(Some(attachment));
            Vec::new()
        }
        Msg::AttachmentRejected { reason } => {
            vec![Effect::Alert(Alert::error(format!(
                "Could not attach file: {reason}"
            )))]
        }
        Msg::AttachmentCleared => {
            state.set_attachment(None);
            Vec::new()
        }
        Msg::AttachmentKindChosen(kind) => {
            state.set_attachment_kind(kind);
            Vec::new()
        }
        Msg::SubmitClicked => match state.begin_submit() {
            Ok(Some(request)) => vec![Effect::SendBroadcast(request)],
            Ok(None) => Vec::new(),
            Err(err) => vec![Effect::Alert(alert_for(&err))],
        },
        Msg::SubmitFinished(result) => {
            state.finish_submit();
            match result {
                Ok(()) => vec![Effect::Alert(Alert::info(SUCCESS_MESSAGE))],
                Err(err) => vec![Effect::Alert(alert_for(&err))],
            }
        }
    };

    (state, effects)
}

fn alert_for(err: &SubmitError) -> Alert {
    match err {
        SubmitError::EmptySelection => Alert::error("Select at least one chat."),
        SubmitError::MissingAttachmentKind => Alert::error("Select a file type."),
        SubmitError::BackendRejected { .. } => {
            Alert::error(format!("Failed to send the messages: {err}."))
        }
    }
}
