//! Host SDK sinks.
//!
//! A sink receives the synthetic initialization message once per bootstrap
//! run. Two sinks ship with the tool: a JSON writer (file, stdout or stderr)
//! and a webhook that posts the message to the add-on's dev server.

use super::init_message::InitMessage;
use crate::errors::DevToolsError;
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Path value selecting stdout for [`JsonFileHost`].
pub const STDOUT_PATH: &str = "-";

/// Receiver of the host initialization message.
#[async_trait]
pub trait HostSdk: Send + Sync {
    /// Deliver the initialization message.
    async fn on_init(&self, message: &InitMessage) -> Result<(), DevToolsError>;
}

/// Destination of a [`JsonFileHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonOutput {
    File(PathBuf),
    Stdout,
    Stderr,
}

/// Writes the message as pretty JSON to a file, stdout or stderr.
#[derive(Debug, Clone)]
pub struct JsonFileHost {
    output: JsonOutput,
}

impl JsonFileHost {
    /// Write to `path`, or to stdout when `path` is `-`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let output = if path.as_os_str() == STDOUT_PATH {
            JsonOutput::Stdout
        } else {
            JsonOutput::File(path)
        };
        Self { output }
    }

    /// Write to stderr, for commands whose stdout carries other output.
    pub fn stderr() -> Self {
        Self {
            output: JsonOutput::Stderr,
        }
    }

    pub fn output(&self) -> &JsonOutput {
        &self.output
    }
}

fn write_console(mut stream: impl Write, rendered: &str) -> Result<(), DevToolsError> {
    writeln!(stream, "{rendered}")
        .map_err(|e| DevToolsError::Configuration(format!("Failed to write init message: {e}")))
}

#[async_trait]
impl HostSdk for JsonFileHost {
    #[instrument(skip_all, fields(output = ?self.output))]
    async fn on_init(&self, message: &InitMessage) -> Result<(), DevToolsError> {
        let rendered = serde_json::to_string_pretty(message).map_err(|e| {
            DevToolsError::Configuration(format!("Failed to serialize init message: {e}"))
        })?;

        let path = match &self.output {
            JsonOutput::Stdout => return write_console(std::io::stdout().lock(), &rendered),
            JsonOutput::Stderr => return write_console(std::io::stderr().lock(), &rendered),
            JsonOutput::File(path) => path,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DevToolsError::Configuration(format!(
                    "Failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        tokio::fs::write(path, rendered).await.map_err(|e| {
            DevToolsError::Configuration(format!(
                "Failed to write init message to {}: {e}",
                path.display()
            ))
        })?;

        info!(target: "devtools.bootstrap.host", "Init message written");
        Ok(())
    }
}

/// POSTs the message to an add-on dev server.
#[derive(Debug, Clone)]
pub struct WebhookHost {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl WebhookHost {
    /// # Errors
    ///
    /// `Configuration` if `url` is not an absolute http(s) URL.
    pub fn new(url: &str) -> Result<Self, DevToolsError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| DevToolsError::Configuration(format!("Invalid init URL '{url}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DevToolsError::Configuration(format!(
                "Init URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            url,
        })
    }
}

#[async_trait]
impl HostSdk for WebhookHost {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn on_init(&self, message: &InitMessage) -> Result<(), DevToolsError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await
            .map_err(|e| DevToolsError::Transport(format!("Init webhook failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DevToolsError::Transport(format!(
                "Init webhook returned status {}",
                status.as_u16()
            )));
        }

        info!(target: "devtools.bootstrap.host", status = status.as_u16(), "Init message delivered");
        Ok(())
    }
}
