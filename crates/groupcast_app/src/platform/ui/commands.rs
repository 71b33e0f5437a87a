use std::path::PathBuf;

use groupcast_core::{AppViewModel, AttachmentKind, ComposerView, Msg, ScreenView};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  filter <text>           show chats whose name contains <text> (empty clears)
  toggle <n>              select or unselect row <n>
  all                     select all shown rows, or unselect them if all are selected
  clear                   unselect every chat
  text <message>          set the message text
  attach <path>           attach a file
  detach                  remove the attachment
  kind audio|document|none  set the attachment type
  send                    broadcast to the selected chats
  help                    show this list
  quit                    exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Filter(String),
    Toggle(usize),
    ToggleAll,
    Clear,
    Text(String),
    Attach(PathBuf),
    Detach,
    Kind(AttachmentKind),
    Send,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command {0:?}; type `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("{0:?} is not a row number")]
    BadIndex(String),
    #[error("{0:?} is not audio, document or none")]
    BadKind(String),
    #[error("no row {0} on screen")]
    NoSuchRow(usize),
    #[error("only available once the chat list is shown")]
    NotComposing,
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim_start();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line.trim_end(), ""),
    };
    match word.to_ascii_lowercase().as_str() {
        "" => Ok(Command::Empty),
        "filter" => Ok(Command::Filter(rest.to_string())),
        "toggle" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("toggle"));
            }
            rest.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Command::Toggle)
                .ok_or_else(|| CommandError::BadIndex(rest.to_string()))
        }
        "all" => Ok(Command::ToggleAll),
        "clear" => Ok(Command::Clear),
        // Message text keeps its inner and trailing whitespace.
        "text" => Ok(Command::Text(
            line.split_once(char::is_whitespace)
                .map(|(_, text)| text.to_string())
                .unwrap_or_default(),
        )),
        "attach" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("attach"));
            }
            Ok(Command::Attach(PathBuf::from(rest)))
        }
        "detach" => Ok(Command::Detach),
        "kind" => AttachmentKind::parse(rest)
            .map(Command::Kind)
            .ok_or_else(|| CommandError::BadKind(rest.to_string())),
        "send" => Ok(Command::Send),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// The composer on screen, or `NotComposing` while loading or linking.
pub fn require_composing(view: &AppViewModel) -> Result<&ComposerView, CommandError> {
    match &view.screen {
        ScreenView::Composing(composer) => Ok(composer),
        _ => Err(CommandError::NotComposing),
    }
}

/// Translates a command that needs no IO into a message, resolving row numbers
/// against the rows currently on screen. Composer commands fail with
/// `NotComposing` while loading or linking.
pub fn command_to_msg(command: &Command, view: &AppViewModel) -> Result<Option<Msg>, CommandError> {
    if matches!(command, Command::Help | Command::Quit | Command::Empty) {
        return Ok(None);
    }
    let composer = require_composing(view)?;
    let msg = match command {
        Command::Filter(query) => Msg::FilterChanged(query.clone()),
        Command::Toggle(row) => {
            let chat = row
                .checked_sub(1)
                .and_then(|index| composer.rows.get(index))
                .ok_or(CommandError::NoSuchRow(*row))?;
            Msg::ChatToggled(chat.id.clone())
        }
        Command::ToggleAll => Msg::ToggleAllVisibleClicked,
        Command::Clear => Msg::ClearSelectionClicked,
        Command::Text(text) => Msg::TextChanged(text.clone()),
        Command::Detach => Msg::AttachmentCleared,
        Command::Kind(kind) => Msg::AttachmentKindChosen(*kind),
        Command::Send => Msg::SubmitClicked,
        // Attachments are loaded by the caller.
        Command::Attach(_) | Command::Help | Command::Quit | Command::Empty => return Ok(None),
    };
    Ok(Some(msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupcast_core::{ChatId, ChatRowView};

    fn composing(ids: &[&str]) -> AppViewModel {
        AppViewModel {
            screen: ScreenView::Composing(ComposerView {
                rows: ids
                    .iter()
                    .map(|id| ChatRowView {
                        id: ChatId::new(*id),
                        subject: format!("Chat {id}"),
                        selected: false,
                    })
                    .collect(),
                ..ComposerView::default()
            }),
            ..AppViewModel::default()
        }
    }

    #[test]
    fn parses_each_command() {
        assert_eq!(parse_command("filter team"), Ok(Command::Filter("team".into())));
        assert_eq!(parse_command("filter"), Ok(Command::Filter(String::new())));
        assert_eq!(parse_command("toggle 2"), Ok(Command::Toggle(2)));
        assert_eq!(parse_command("ALL"), Ok(Command::ToggleAll));
        assert_eq!(parse_command("clear"), Ok(Command::Clear));
        assert_eq!(
            parse_command("attach /tmp/a b.pdf"),
            Ok(Command::Attach(PathBuf::from("/tmp/a b.pdf")))
        );
        assert_eq!(parse_command("detach"), Ok(Command::Detach));
        assert_eq!(parse_command("kind audio"), Ok(Command::Kind(AttachmentKind::Audio)));
        assert_eq!(parse_command("kind none"), Ok(Command::Kind(AttachmentKind::None)));
        assert_eq!(parse_command("send"), Ok(Command::Send));
        assert_eq!(parse_command("  "), Ok(Command::Empty));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
    }

    #[test]
    fn text_keeps_spacing() {
        assert_eq!(
            parse_command("text  hello   world "),
            Ok(Command::Text(" hello   world ".into()))
        );
        assert_eq!(parse_command("text"), Ok(Command::Text(String::new())));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert_eq!(parse_command("toggle"), Err(CommandError::MissingArgument("toggle")));
        assert_eq!(parse_command("toggle 0"), Err(CommandError::BadIndex("0".into())));
        assert_eq!(parse_command("toggle x"), Err(CommandError::BadIndex("x".into())));
        assert_eq!(parse_command("kind video"), Err(CommandError::BadKind("video".into())));
        assert_eq!(parse_command("attach"), Err(CommandError::MissingArgument("attach")));
        assert_eq!(parse_command("launch"), Err(CommandError::Unknown("launch".into())));
    }

    #[test]
    fn toggle_resolves_row_against_current_view() {
        let view = composing(&["g1", "g2"]);
        assert_eq!(
            command_to_msg(&Command::Toggle(2), &view),
            Ok(Some(Msg::ChatToggled(ChatId::new("g2"))))
        );
        assert_eq!(
            command_to_msg(&Command::Toggle(3), &view),
            Err(CommandError::NoSuchRow(3))
        );
        assert_eq!(
            command_to_msg(&Command::Toggle(1), &AppViewModel::default()),
            Err(CommandError::NotComposing)
        );
    }

    #[test]
    fn row_zero_is_not_a_row() {
        let view = composing(&["g1"]);
        assert_eq!(
            command_to_msg(&Command::Toggle(0), &view),
            Err(CommandError::NoSuchRow(0))
        );
    }

    #[test]
    fn plain_commands_map_to_messages() {
        let view = composing(&[]);
        assert_eq!(
            command_to_msg(&Command::ToggleAll, &view),
            Ok(Some(Msg::ToggleAllVisibleClicked))
        );
        assert_eq!(command_to_msg(&Command::Send, &view), Ok(Some(Msg::SubmitClicked)));
        assert_eq!(command_to_msg(&Command::Help, &view), Ok(None));
    }

    #[test]
    fn composer_commands_need_the_composer() {
        let linking = AppViewModel {
            screen: ScreenView::Linking {
                qr: "2@qr".into(),
            },
            ..AppViewModel::default()
        };
        for view in [AppViewModel::default(), linking] {
            for command in [
                Command::Send,
                Command::ToggleAll,
                Command::Clear,
                Command::Filter("team".into()),
                Command::Text("hi".into()),
                Command::Detach,
                Command::Kind(AttachmentKind::Audio),
                Command::Attach(PathBuf::from("a.pdf")),
            ] {
                assert_eq!(
                    command_to_msg(&command, &view),
                    Err(CommandError::NotComposing),
                    "{command:?}"
                );
            }
            assert_eq!(command_to_msg(&Command::Help, &view), Ok(None));
            assert_eq!(command_to_msg(&Command::Quit, &view), Ok(None));
        }
    }
}
