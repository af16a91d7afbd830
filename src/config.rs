// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Runtime configuration for the developer service subsystem.
//!
//! Build-time switches (product builds, ahead-of-time deployments, the heap
//! snapshot writer) are modelled as a [`Capabilities`] set that every entry
//! point consults before doing any work.

use std::fs;
use std::path::Path;

use bitflags::bitflags;
use log::warn;
use serde::Deserialize;

use crate::error::{DevError, DevResult};

/// Environment variable naming the active configuration file.
pub const CONFIG_PATH_ENV: &str = "DEVSVC_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/devsvc.json";

bitflags! {
    /// Features available to the current build and embedding.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// Diagnostics are compiled in (non-product build).
        const DIAGNOSTICS = 0b0001;
        /// Code was compiled ahead of time.
        const PRECOMPILED = 0b0010;
        const HEAP_SNAPSHOT_WRITER = 0b0100;
        /// The embedder can create and write files.
        const FILE_WRITE = 0b1000;
    }
}

impl Capabilities {
    /// Whether the debugger pause hook may be used.
    pub fn debugger(self) -> bool {
        self.contains(Self::DIAGNOSTICS) && !self.contains(Self::PRECOMPILED)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebServerConfig {
    pub host: String,
    pub port: u16,
    pub enabled_at_startup: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8181,
            enabled_at_startup: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub diagnostics: bool,
    pub precompiled: bool,
    pub heap_snapshot_writer: bool,
    pub file_write: bool,
    pub web_server: WebServerConfig,
    pub silence_output: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            diagnostics: true,
            precompiled: false,
            heap_snapshot_writer: true,
            file_write: true,
            web_server: WebServerConfig::default(),
            silence_output: false,
        }
    }
}

impl RuntimeConfig {
    /// Configuration of a product build: every diagnostic feature is off.
    pub fn product() -> Self {
        Self {
            diagnostics: false,
            heap_snapshot_writer: false,
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> DevResult<Self> {
        serde_json::from_str(text).map_err(|e| DevError::Config(e.to_string()))
    }

    pub fn load_file(path: &Path) -> DevResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| DevError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Load the file named by `DEVSVC_CONFIG`, falling back to defaults.
    pub fn load_active() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        match Self::load_file(Path::new(&path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("using default runtime config: {}", e);
                Self::default()
            }
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::DIAGNOSTICS, self.diagnostics);
        caps.set(Capabilities::PRECOMPILED, self.precompiled);
        caps.set(Capabilities::HEAP_SNAPSHOT_WRITER, self.heap_snapshot_writer);
        caps.set(Capabilities::FILE_WRITE, self.file_write);
        caps
    }
}
