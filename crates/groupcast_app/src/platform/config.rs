use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use super::logging::LogDestination;

const STATE_DIR_NAME: &str = "groupcast";

/// Broadcast one message to many WhatsApp chats through a linked backend.
#[derive(Debug, Parser)]
#[command(name = "groupcast", version)]
pub struct Args {
    /// Base URL of the backend (http, https, ws or wss).
    #[arg(long, env = "GROUPCAST_BACKEND_URL", value_parser = parse_backend_url)]
    pub backend_url: Url,

    /// Directory for the session identity and the log file.
    #[arg(long, env = "GROUPCAST_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, env = "GROUPCAST_LOG", value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Connect timeout for both the realtime channel and the broadcast request.
    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,
}

impl Args {
    pub fn state_dir(&self) -> PathBuf {
        match &self.state_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .map(|dir| dir.join(STATE_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(format!("./.{STATE_DIR_NAME}"))),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|err| format!("not a valid url: {err}"))?;
    match url.scheme() {
        "http" | "https" | "ws" | "wss" => Ok(url),
        other => Err(format!("unsupported scheme {other:?}")),
    }
}
