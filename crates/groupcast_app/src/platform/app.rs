use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, Context};
use clap::Parser;
use groupcast_core::{update, AppState, IdentityStore, Msg};
use groupcast_engine::{ensure_state_dir, load_attachment, EngineConfig, EngineHandle};
use groupcast_logging::{cast_error, cast_info, cast_warn};

use super::config::Args;
use super::effects::{self, EffectRunner};
use super::logging::{self, LOG_FILENAME};
use super::persistence::LocalStorage;
use super::ui::commands::{self, Command, HELP};
use super::ui::render;

/// Everything the dispatch loop reacts to, in arrival order.
pub enum AppInput {
    Line(String),
    Engine(Msg),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let args = Args::parse();
    let state_dir = args.state_dir();
    ensure_state_dir(&state_dir)
        .with_context(|| format!("cannot use state directory {}", state_dir.display()))?;
    logging::initialize(args.log, &state_dir.join(LOG_FILENAME));
    cast_info!("groupcast starting, backend {}", args.backend_url);

    let storage = LocalStorage::open(&state_dir)
        .inspect_err(|err| cast_error!("Local storage unavailable: {}", err))
        .context("cannot open local storage")?;
    let session_id = IdentityStore::new(storage)
        .get_or_create_session_id()
        .inspect_err(|err| cast_error!("Session identity unavailable: {}", err))
        .context("cannot establish the session identity")?;
    cast_info!("Session {}", session_id.redacted());

    let config =
        EngineConfig::new(args.backend_url.clone()).with_connect_timeout(args.connect_timeout());
    let (engine, events) = EngineHandle::new(config)
        .map_err(|failure| anyhow!("invalid backend url: {}", failure.message))?;

    let (input_tx, input_rx) = mpsc::channel();
    effects::spawn_event_pump(events, input_tx.clone());
    spawn_stdin_reader(input_tx);

    let stdout = io::stdout();
    let mut app = App::new(EffectRunner::new(engine), stdout.lock());
    app.draw()?;
    writeln!(app.out, "Type `help` for commands.")?;
    app.dispatch(Msg::SessionEstablished(session_id))?;

    while let Ok(input) = input_rx.recv() {
        match input {
            AppInput::Engine(msg) => {
                if let Some(msg) = app.gate.admit(msg) {
                    app.dispatch(msg)?;
                }
            }
            AppInput::Line(line) => {
                if !app.handle_line(&line)? {
                    break;
                }
            }
            AppInput::InputClosed => break,
        }
    }
    cast_info!("groupcast exiting");
    Ok(())
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if input_tx.send(AppInput::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    cast_warn!("stdin read failed: {}", err);
                    break;
                }
            }
        }
        let _ = input_tx.send(AppInput::InputClosed);
    });
}

/// Holds the app on an alert until the user presses Enter. Engine messages
/// that arrive meanwhile are queued and replayed in order.
#[derive(Default)]
struct AlertGate {
    holding: bool,
    deferred: VecDeque<Msg>,
}

impl AlertGate {
    fn hold(&mut self) {
        self.holding = true;
    }

    fn is_holding(&self) -> bool {
        self.holding
    }

    /// Returns the message when it may be dispatched now.
    fn admit(&mut self, msg: Msg) -> Option<Msg> {
        if self.holding {
            self.deferred.push_back(msg);
            None
        } else {
            Some(msg)
        }
    }

    fn release(&mut self) {
        self.holding = false;
    }

    fn next_deferred(&mut self) -> Option<Msg> {
        if self.holding {
            return None;
        }
        self.deferred.pop_front()
    }
}

struct App<W: Write> {
    state: AppState,
    runner: EffectRunner,
    gate: AlertGate,
    out: W,
}

impl<W: Write> App<W> {
    fn new(runner: EffectRunner, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            gate: AlertGate::default(),
            out,
        }
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        if was_dirty {
            self.draw()?;
        }
        if self.runner.run(effects, &mut self.out)? {
            self.gate.hold();
            writeln!(self.out, "Press Enter to continue.")?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Dismisses the alert and replays what arrived while it was up.
    fn acknowledge(&mut self) -> io::Result<()> {
        self.gate.release();
        while let Some(msg) = self.gate.next_deferred() {
            self.dispatch(msg)?;
        }
        if !self.gate.is_holding() {
            self.draw()?;
        }
        Ok(())
    }

    fn draw(&mut self) -> io::Result<()> {
        let view = self.state.view();
        writeln!(self.out)?;
        write!(self.out, "{}", render::render(&view))?;
        self.out.flush()
    }

    /// Returns false when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        if self.gate.is_holding() {
            self.acknowledge()?;
            return Ok(true);
        }
        let command = match commands::parse_command(line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(self.out, "{err}")?;
                return Ok(true);
            }
        };
        match &command {
            Command::Quit => return Ok(false),
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Empty => self.draw()?,
            Command::Attach(path) => {
                if let Err(err) = commands::require_composing(&self.state.view()) {
                    writeln!(self.out, "{err}")?;
                    return Ok(true);
                }
                let msg = match load_attachment(path) {
                    Ok(part) => Msg::AttachmentChosen(effects::to_attachment(part)),
                    Err(err) => Msg::AttachmentRejected {
                        reason: err.to_string(),
                    },
                };
                self.dispatch(msg)?;
            }
            _ => match commands::command_to_msg(&command, &self.state.view()) {
                Ok(Some(msg)) => self.dispatch(msg)?,
                Ok(None) => {}
                Err(err) => writeln!(self.out, "{err}")?,
            },
        }
        Ok(true)
    }
}
