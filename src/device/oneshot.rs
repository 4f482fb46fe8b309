//! One-shot `adb` invocations outside the persistent session.
//!
//! Transfers and device queries (`push`, `pull`, `devices -l`, ...) are
//! plain adb subcommands rather than interactive shell text, so each one
//! runs as its own process.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::debug;

use crate::error::AdbShellError;
use crate::output::OutputSanitizer;
use crate::Result;

/// Default limit for one-shot invocations; transfers can be slow.
pub const DEFAULT_ONESHOT_TIMEOUT: Duration = Duration::from_secs(300);

/// An `adb [-s <serial>] <args...>` invocation.
#[derive(Debug, Clone)]
pub struct AdbCommand {
    adb: String,
    serial: Option<String>,
    args: Vec<String>,
    timeout: Duration,
}

impl AdbCommand {
    /// Create a command for the given adb executable.
    pub fn new(adb: impl Into<String>) -> Self {
        Self {
            adb: adb.into(),
            serial: None,
            args: Vec::new(),
            timeout: DEFAULT_ONESHOT_TIMEOUT,
        }
    }

    /// Target a specific device.
    pub fn serial(mut self, serial: Option<&str>) -> Self {
        self.serial = serial.filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the execution timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    /// Full argument vector passed to adb.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        if let Some(serial) = &self.serial {
            argv.push("-s".to_string());
            argv.push(serial.clone());
        }
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Run to completion and capture stdout and stderr.
    pub async fn run(&self) -> Result<AdbOutput> {
        let start = Instant::now();
        let argv = self.argv();
        debug!(adb = %self.adb, ?argv, "running one-shot adb command");

        let child = Command::new(&self.adb)
            .args(&argv)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Err(_) => return Err(AdbShellError::Timeout(self.timeout)),
            Ok(Err(source)) => {
                return Err(AdbShellError::Spawn {
                    program: self.adb.clone(),
                    source,
                })
            }
            Ok(Ok(output)) => output,
        };

        let mut raw = output.stdout;
        raw.extend_from_slice(&output.stderr);
        let text = OutputSanitizer::strip_ansi(&raw);
        let text = OutputSanitizer::trim_line_endings(&text).to_string();

        Ok(AdbOutput {
            text,
            exit_code: output.status.code(),
            duration: start.elapsed(),
        })
    }
}

/// Captured result of a one-shot invocation.
#[derive(Debug, Clone, Default)]
pub struct AdbOutput {
    /// stdout followed by stderr, trailing line endings trimmed.
    pub text: String,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

impl AdbOutput {
    /// Check if adb exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
