use std::time::Duration;

use groupcast_logging::{cast_info, cast_warn};
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::{BroadcastForm, FailureKind, SubmitFailure};

/// Path of the broadcast endpoint below the backend base url.
pub const SEND_MESSAGES_PATH: &str = "sendMessages";

/// Only connection setup is bounded; the request itself may take as long as
/// the backend needs to fan out.
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub connect_timeout: Duration,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, form: BroadcastForm) -> Result<(), SubmitFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSubmitter {
    endpoint: Url,
    settings: SubmitSettings,
}

impl ReqwestSubmitter {
    pub fn new(backend: &Url, settings: SubmitSettings) -> Result<Self, SubmitFailure> {
        Ok(Self {
            endpoint: endpoint_url(backend, SEND_MESSAGES_PATH)?,
            settings,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_client(&self) -> Result<reqwest::Client, SubmitFailure> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| SubmitFailure::new(FailureKind::Network, err.to_string()))
    }
}

/// Joins `path` onto the base url, mapping `ws(s)` to `http(s)`.
pub fn endpoint_url(base: &Url, path: &str) -> Result<Url, SubmitFailure> {
    let scheme = match base.scheme() {
        "http" | "ws" => "http",
        "https" | "wss" => "https",
        other => {
            return Err(SubmitFailure::new(
                FailureKind::InvalidUrl,
                format!("unsupported scheme {other}"),
            ))
        }
    };
    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|_| SubmitFailure::new(FailureKind::InvalidUrl, base.to_string()))?;
    url.set_path(&format!("{}/{path}", base.path().trim_end_matches('/')));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_form(form: BroadcastForm) -> Result<Form, SubmitFailure> {
    let mut multipart = Form::new();
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }
    if let Some(file) = form.file {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|err| SubmitFailure::new(FailureKind::InvalidFile, err.to_string()))?;
        multipart = multipart.part("file", part);
    }
    Ok(multipart)
}

#[async_trait::async_trait]
impl Submitter for ReqwestSubmitter {
    async fn submit(&self, form: BroadcastForm) -> Result<(), SubmitFailure> {
        let client = self.build_client()?;
        let has_file = form.file.is_some();
        let multipart = build_form(form)?;

        let response = client
            .post(self.endpoint.clone())
            .multipart(multipart)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            cast_warn!("Broadcast rejected with {}", status);
            return Err(SubmitFailure::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        cast_info!("Broadcast accepted ({}, file={})", status, has_file);
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitFailure {
    if err.is_timeout() {
        return SubmitFailure::new(FailureKind::Timeout, err.to_string());
    }
    SubmitFailure::new(FailureKind::Network, err.to_string())
}
