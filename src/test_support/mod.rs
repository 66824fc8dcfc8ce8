//! Test utilities and mocks for unit tests.
//!
//! Provides stand-ins for the three seams the provisioning engine talks to:
//! network downloads, external commands and `PATH` lookups. The mocks share
//! their call logs through `Arc`, so a test can keep a clone after handing
//! one to the engine and inspect it afterwards.
//!
//! # Example
//!
//! ```rust,ignore
//! let downloader = MockDownloader::new().with("json.hpp", b"// header".to_vec());
//! let runner = MockRunner::new().failing("make install");
//! // ... run a fetcher ...
//! assert_eq!(downloader.requests().len(), 1);
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::ProvisionError;
use crate::sources::http::Downloader;
use crate::toolchain::ExecutableResolver;
use crate::util::process::{CommandRunner, ProcessBuilder};

pub use fixtures::*;

/// Mock downloader serving canned bodies by URL substring.
#[derive(Debug, Clone, Default)]
pub struct MockDownloader {
    responses: Vec<(String, Vec<u8>)>,
    default_body: Option<Vec<u8>>,
    failing: Vec<String>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockDownloader {
    /// Create a downloader with no responses.
    pub fn new() -> Self {
        MockDownloader::default()
    }

    /// Serve `body` for URLs containing `pattern`. First match wins.
    pub fn with(mut self, pattern: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses.push((pattern.to_string(), body.into()));
        self
    }

    /// Serve `body` for URLs no other pattern matches.
    pub fn with_default(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.default_body = Some(body.into());
        self
    }

    /// Fail URLs containing `pattern` with an HTTP 404.
    pub fn failing(mut self, pattern: &str) -> Self {
        self.failing.push(pattern.to_string());
        self
    }

    /// All requested URLs, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl Downloader for MockDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), ProvisionError> {
        self.requests.lock().unwrap().push(url.to_string());

        if self.failing.iter().any(|p| url.contains(p.as_str())) {
            return Err(ProvisionError::transfer(url, "HTTP 404 Not Found"));
        }

        let body = self
            .responses
            .iter()
            .find(|(p, _)| url.contains(p.as_str()))
            .map(|(_, body)| body)
            .or(self.default_body.as_ref())
            .ok_or_else(|| ProvisionError::transfer(url, "no mock response"))?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProvisionError::fs("create", parent, e))?;
        }
        std::fs::write(dest, body).map_err(|e| ProvisionError::transfer(url, e.to_string()))
    }
}

/// Mock command runner recording every command line.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    failing: Vec<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRunner {
    /// Create a runner where every command succeeds.
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Fail commands whose rendered line contains `pattern`.
    pub fn failing(mut self, pattern: &str) -> Self {
        self.failing.push(pattern.to_string());
        self
    }

    /// All rendered command lines, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<(), ProvisionError> {
        let line = cmd.display_command();
        self.calls.lock().unwrap().push(line.clone());

        if self.failing.iter().any(|p| line.contains(p.as_str())) {
            return Err(ProvisionError::Build {
                command: line,
                code: Some(2),
                stderr: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Resolver backed by a fixed name-to-path table.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    entries: HashMap<String, PathBuf>,
}

impl MapResolver {
    /// Create a resolver that finds nothing.
    pub fn new() -> Self {
        MapResolver::default()
    }

    /// Resolve `name` to `path`.
    pub fn with(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(name.to_string(), path.into());
        self
    }
}

impl ExecutableResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.entries.get(name).cloned()
    }
}
