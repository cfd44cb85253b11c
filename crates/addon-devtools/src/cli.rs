//! Command line interface.
//!
//! Argument definitions (clap derive) and the `config` subcommands, which
//! only touch the store and never the network.

use crate::bootstrap::{HostSdk, JsonFileHost, JsonOutput, WebhookHost};
use crate::config::{is_known_key, KEY_MEETING_CODE, KNOWN_KEYS, SECRET_KEYS};
use crate::errors::DevToolsError;
use clap::{Args, Parser, Subcommand};
use common::store::ConfigStore;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Default store file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = ".meet-dev-sdk.json";

/// Environment variable overriding the store path.
pub const STORE_PATH_VAR: &str = "ADDON_DEVTOOLS_STORE";

/// Default bind address of the handle server.
pub const DEFAULT_BIND: &str = "127.0.0.1:7070";

const REDACTED: &str = "[REDACTED]";

/// Local bootstrap for add-on SDK sessions
#[derive(Parser, Debug)]
#[command(name = "addon-devtools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path of the JSON configuration store
    #[arg(long, global = true, env = STORE_PATH_VAR, default_value = DEFAULT_STORE_PATH)]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read and edit the configuration store
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },

    /// Run the bootstrap once and print the session token
    Token {
        #[command(flatten)]
        init: InitSinkArgs,
    },

    /// Serve the session token handle over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        #[command(flatten)]
        init: InitSinkArgs,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Set a value
    Set { key: String, value: String },

    /// Print a value
    Get { key: String },

    /// Remove a value
    Unset { key: String },

    /// Print every stored value, secrets redacted
    Show,

    /// Forget the cached meeting code
    ClearCode,
}

/// Where the host initialization message goes, if anywhere.
#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct InitSinkArgs {
    /// Write the init message as JSON to PATH (`-` for stdout)
    #[arg(long, value_name = "PATH")]
    pub init_out: Option<PathBuf>,

    /// POST the init message to URL
    #[arg(long, value_name = "URL")]
    pub init_url: Option<String>,
}

impl InitSinkArgs {
    /// The JSON sink selected by `--init-out`, if any.
    ///
    /// With `stdout_reserved` set, `-` goes to stderr instead so stdout
    /// carries a single JSON document.
    pub fn json_host(&self, stdout_reserved: bool) -> Option<JsonFileHost> {
        let host = JsonFileHost::new(self.init_out.clone()?);
        if stdout_reserved && host.output() == &JsonOutput::Stdout {
            return Some(JsonFileHost::stderr());
        }
        Some(host)
    }

    /// Build the selected sink.
    ///
    /// # Errors
    ///
    /// `Configuration` if the init URL is invalid.
    pub fn host_sdk(
        &self,
        stdout_reserved: bool,
    ) -> Result<Option<Arc<dyn HostSdk>>, DevToolsError> {
        if let Some(host) = self.json_host(stdout_reserved) {
            return Ok(Some(Arc::new(host)));
        }
        if let Some(url) = &self.init_url {
            return Ok(Some(Arc::new(WebhookHost::new(url)?)));
        }
        Ok(None)
    }
}

fn ensure_known_key(key: &str) -> Result<(), DevToolsError> {
    if is_known_key(key) {
        return Ok(());
    }
    Err(DevToolsError::Configuration(format!(
        "Unknown key '{key}', expected one of: {}",
        KNOWN_KEYS.join(", ")
    )))
}

fn display_value<'a>(key: &str, value: &'a str) -> &'a str {
    if SECRET_KEYS.contains(&key) {
        REDACTED
    } else {
        value
    }
}

/// Run a `config` subcommand against `store`, writing output to `out`.
///
/// # Errors
///
/// `Configuration` for unknown keys, store failures or output failures.
pub fn run_config_command(
    store: &dyn ConfigStore,
    cmd: &ConfigCommand,
    out: &mut dyn Write,
) -> Result<(), DevToolsError> {
    let write_err =
        |e: std::io::Error| DevToolsError::Configuration(format!("Failed to write output: {e}"));

    match cmd {
        ConfigCommand::Set { key, value } => {
            ensure_known_key(key)?;
            store.set(key, value)?;
        }
        ConfigCommand::Get { key } => {
            ensure_known_key(key)?;
            if let Some(value) = store.get(key)? {
                writeln!(out, "{}", display_value(key, &value)).map_err(write_err)?;
            }
        }
        ConfigCommand::Unset { key } => {
            ensure_known_key(key)?;
            store.remove(key)?;
        }
        ConfigCommand::Show => {
            for (key, value) in store.entries()? {
                writeln!(out, "{key} = {}", display_value(&key, &value)).map_err(write_err)?;
            }
        }
        ConfigCommand::ClearCode => {
            store.remove(KEY_MEETING_CODE)?;
        }
    }
    Ok(())
}
