use std::sync::Once;

use groupcast_core::{
    update, AppState, AttachmentKind, Chat, ChannelStatus, ChatId, Effect, Msg, ScreenView,
    SessionId, Submission,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(groupcast_logging::initialize_for_tests);
}

const SESSION: &str = "5f0c8a4e-3d1b-4c52-9b6e-1f2a3b4c5d6e";

fn established() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::SessionEstablished(SessionId::new(SESSION)),
    );
    state
}

fn qr_for(target: &str) -> Msg {
    Msg::QrReceived {
        target: target.to_string(),
        qr: "2@abc,def,ghi".to_string(),
    }
}

#[test]
fn starts_on_loading_screen() {
    init_logging();
    let view = AppState::new().view();
    assert_eq!(view.screen, ScreenView::Loading);
    assert_eq!(view.channel, ChannelStatus::Idle);
    assert!(view.session.is_none());
}

#[test]
fn session_established_opens_channel_once() {
    init_logging();
    let (mut state, effects) = update(
        AppState::new(),
        Msg::SessionEstablished(SessionId::new(SESSION)),
    );
    assert_eq!(
        effects,
        vec![Effect::OpenChannel {
            session_id: SessionId::new(SESSION)
        }]
    );
    assert_eq!(state.view().channel, ChannelStatus::Connecting);
    assert_eq!(state.view().session.as_deref(), Some("5f0c8a4e…"));
    assert!(state.consume_dirty());

    let (state, effects) = update(state, Msg::SessionEstablished(SessionId::new("other")));
    assert!(effects.is_empty());
    assert_eq!(state.session_id(), Some(&SessionId::new(SESSION)));
}

#[test]
fn qr_for_our_session_shows_linking_screen() {
    init_logging();
    let (mut state, effects) = update(established(), qr_for(SESSION));
    assert!(effects.is_empty());
    assert_eq!(
        state.view().screen,
        ScreenView::Linking {
            qr: "2@abc,def,ghi".to_string()
        }
    );
    assert!(state.consume_dirty());
}

#[test]
fn qr_for_other_session_is_ignored() {
    init_logging();
    let mut state = established();
    assert!(state.consume_dirty());

    let (mut next, effects) = update(state, qr_for("someone-else"));
    assert!(effects.is_empty());
    assert_eq!(next.view().screen, ScreenView::Loading);
    assert!(!next.consume_dirty());
}

#[test]
fn qr_before_session_is_ignored() {
    init_logging();
    let (state, _) = update(AppState::new(), qr_for(SESSION));
    assert_eq!(state.view().screen, ScreenView::Loading);
}

#[test]
fn newer_qr_replaces_older() {
    init_logging();
    let (state, _) = update(established(), qr_for(SESSION));
    let (state, _) = update(
        state,
        Msg::QrReceived {
            target: SESSION.to_string(),
            qr: "2@second".to_string(),
        },
    );
    assert_eq!(
        state.view().screen,
        ScreenView::Linking {
            qr: "2@second".to_string()
        }
    );
}

#[test]
fn chats_clear_qr_and_show_composer() {
    init_logging();
    let (state, _) = update(established(), qr_for(SESSION));
    let (state, effects) = update(
        state,
        Msg::ChatsReceived(Some(vec![
            Chat::new("1", "Team A"),
            Chat::new("2", "Team B"),
        ])),
    );
    assert!(effects.is_empty());
    match state.view().screen {
        ScreenView::Composing(composer) => {
            assert_eq!(composer.total_chats, 2);
            assert_eq!(composer.rows.len(), 2);
            assert!(!composer.busy);
        }
        other => panic!("expected composer, got {other:?}"),
    }
}

#[test]
fn null_chats_marker_keeps_previous_list() {
    init_logging();
    let (state, _) = update(
        established(),
        Msg::ChatsReceived(Some(vec![Chat::new("1", "Team A")])),
    );
    let (state, _) = update(state, qr_for(SESSION));
    let (state, _) = update(state, Msg::ChatsReceived(None));
    match state.view().screen {
        ScreenView::Composing(composer) => assert_eq!(composer.total_chats, 1),
        other => panic!("expected composer, got {other:?}"),
    }
}

#[test]
fn null_chats_marker_leaves_loading_with_empty_list() {
    init_logging();
    let (state, _) = update(established(), Msg::ChatsReceived(None));
    match state.view().screen {
        ScreenView::Composing(composer) => assert_eq!(composer.total_chats, 0),
        other => panic!("expected composer, got {other:?}"),
    }
}

#[test]
fn channel_close_keeps_current_screen() {
    init_logging();
    let (state, _) = update(established(), Msg::ChannelConnected);
    assert_eq!(state.view().channel, ChannelStatus::Connected);

    let (state, effects) = update(
        state,
        Msg::ChannelClosed {
            reason: "connection reset".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().screen, ScreenView::Loading);
    assert_eq!(
        state.view().channel,
        ChannelStatus::Closed {
            reason: "connection reset".to_string()
        }
    );
}

#[test]
fn send_is_ignored_while_qr_is_showing() {
    init_logging();
    let (state, _) = update(
        established(),
        Msg::ChatsReceived(Some(vec![Chat::new("1", "Team A")])),
    );
    let (state, _) = update(state, Msg::ChatToggled(ChatId::new("1")));
    let (state, _) = update(state, qr_for(SESSION));
    assert!(matches!(state.view().screen, ScreenView::Linking { .. }));

    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(state.submission(), Submission::Idle);

    // Back on the composer the kept selection can be sent again.
    let (state, _) = update(state, Msg::ChatsReceived(None));
    let (_state, effects) = update(state, Msg::SubmitClicked);
    assert!(matches!(effects.as_slice(), [Effect::SendBroadcast(_)]));
}

#[test]
fn composer_edits_are_ignored_before_chats_arrive() {
    init_logging();
    let mut state = established();
    assert!(state.consume_dirty());
    let before = state.clone();

    for msg in [
        Msg::FilterChanged("team".to_string()),
        Msg::ChatToggled(ChatId::new("1")),
        Msg::SelectAllVisibleClicked,
        Msg::DeselectAllVisibleClicked,
        Msg::ToggleAllVisibleClicked,
        Msg::ClearSelectionClicked,
        Msg::TextChanged("hello".to_string()),
        Msg::AttachmentCleared,
        Msg::AttachmentKindChosen(AttachmentKind::Document),
        Msg::SubmitClicked,
    ] {
        let (next, effects) = update(state, msg.clone());
        assert!(effects.is_empty(), "{msg:?} produced effects");
        assert_eq!(next, before, "{msg:?} changed state");
        state = next;
    }

    let (state, _) = update(state, qr_for(SESSION));
    let linking = state.clone();
    let (next, effects) = update(state, Msg::ToggleAllVisibleClicked);
    assert!(effects.is_empty());
    assert_eq!(next, linking);
}
