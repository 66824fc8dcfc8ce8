//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::ProvisionError;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion.
    pub fn exec(&self) -> Result<Output, ProvisionError> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd.output().map_err(|e| ProvisionError::Build {
            command: self.display_command(),
            code: None,
            stderr: format!("failed to spawn: {}", e),
        })
    }

    /// Execute and require success.
    pub fn exec_and_check(&self) -> Result<Output, ProvisionError> {
        let output = self.exec()?;
        if !output.status.success() {
            return Err(ProvisionError::Build {
                command: self.display_command(),
                code: output.status.code(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr), 40),
            });
        }
        Ok(output)
    }

    /// Execute with inherited stdio and require success.
    pub fn status_and_check(&self) -> Result<(), ProvisionError> {
        let status = self
            .build_command()
            .status()
            .map_err(|e| ProvisionError::Build {
                command: self.display_command(),
                code: None,
                stderr: format!("failed to spawn: {}", e),
            })?;

        if !status.success() {
            return Err(ProvisionError::Build {
                command: self.display_command(),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Display the command for logs and error messages.
    ///
    /// Environment overrides are rendered shell-style in front of the program.
    pub fn display_command(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, v))
            .collect();
        parts.push(self.program.display().to_string());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Keep the last `lines` lines of a command's output.
fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// Runs external commands on behalf of the fetchers.
pub trait CommandRunner {
    /// Run the command to completion, failing on a non-zero exit.
    fn run(&self, cmd: &ProcessBuilder) -> Result<(), ProvisionError>;
}

/// Runs commands on the host.
///
/// By default output is captured and only the tail of stderr is surfaced
/// on failure. A streaming runner passes the terminal through instead,
/// which interactive commands such as `sudo` need.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner {
    stream_output: bool,
}

impl SystemRunner {
    /// Runner that captures command output.
    pub fn new() -> Self {
        SystemRunner::default()
    }

    /// Runner that lets commands write straight to the terminal.
    pub fn streaming() -> Self {
        SystemRunner {
            stream_output: true,
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<(), ProvisionError> {
        tracing::debug!("running `{}`", cmd.display_command());
        if self.stream_output {
            return cmd.status_and_check();
        }
        let output = cmd.exec_and_check()?;
        tracing::trace!("{}", String::from_utf8_lossy(&output.stdout));
        Ok(())
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Number of parallel jobs handed to `make`.
pub fn parallel_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
