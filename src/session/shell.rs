//! Persistent shell session with marker-framed request/response.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::marker::MarkerGenerator;
use super::reader::{Chunk, OutputPump};
use super::state::SessionState;
use crate::error::AdbShellError;
use crate::output::OutputSanitizer;
use crate::Result;

/// Default deadline for a single `execute()` round trip.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacity of the output chunk channel.
const CHUNK_CHANNEL_CAPACITY: usize = 64;

/// Describes the child process a session drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLauncher {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl ShellLauncher {
    /// Launch `program` with a UTF-8 locale and a basic terminal type.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: vec![
                ("LANG".into(), "en_US.UTF-8".into()),
                ("LC_ALL".into(), "en_US.UTF-8".into()),
                ("TERM".into(), "xterm".into()),
            ],
        }
    }

    /// `adb [-s <serial>] shell`.
    pub fn adb_shell(adb: impl Into<String>, serial: Option<&str>) -> Self {
        let mut launcher = Self::new(adb);
        if let Some(serial) = serial.filter(|s| !s.is_empty()) {
            launcher = launcher.arg("-s").arg(serial);
        }
        launcher.arg("shell")
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.env.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.env.push((key, value)),
        }
        self
    }

    /// Program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Environment overrides.
    pub fn envs(&self) -> &[(String, String)] {
        &self.env
    }
}

/// Live resources of a started session.
struct RunningShell {
    child: Child,
    stdin: ChildStdin,
    output: mpsc::Receiver<Chunk>,
    framing: Framing,
    pump: JoinHandle<()>,
}

/// A persistent shell process driven as a command/response channel.
///
/// Each [`execute`](ShellSession::execute) writes `<command>; echo <marker>`
/// and reads until the marker shows up in the output. Commands are strictly
/// sequential; `&mut self` on `execute` keeps a single command in flight.
pub struct ShellSession {
    launcher: ShellLauncher,
    state: SessionState,
    running: Option<RunningShell>,
    markers: MarkerGenerator,
    timeout: Duration,
    last_error: Option<String>,
}

impl ShellSession {
    /// Create a session that has not been started yet.
    pub fn new(launcher: ShellLauncher) -> Self {
        Self {
            launcher,
            state: SessionState::NotStarted,
            running: None,
            markers: MarkerGenerator::new(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
            last_error: None,
        }
    }

    /// Set the per-command deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if the session accepts commands.
    pub fn is_running(&self) -> bool {
        self.state.can_execute()
    }

    /// Text of the most recent transport failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of commands written so far.
    pub fn command_count(&self) -> u64 {
        self.markers.issued()
    }

    /// Per-command deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The launcher this session spawns.
    pub fn launcher(&self) -> &ShellLauncher {
        &self.launcher
    }

    /// Launch the child process.
    ///
    /// stdout and stderr share one pipe so their interleaving follows the
    /// order the shell wrote them. Fails if the child cannot be spawned or
    /// has already exited when checked right after spawning.
    pub async fn start(&mut self) -> Result<()> {
        if self.state.can_execute() {
            return Ok(());
        }

        match self.spawn_child() {
            Ok(running) => {
                info!(
                    program = %self.launcher.program,
                    args = ?self.launcher.args,
                    "shell session started"
                );
                self.running = Some(running);
                self.state = SessionState::Running;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.record_error(&e);
                self.state = SessionState::Stopped;
                Err(e)
            }
        }
    }

    fn spawn_child(&self) -> Result<RunningShell> {
        let (read_end, write_end) = std::io::pipe()?;
        let stderr_end = write_end.try_clone()?;

        let mut command = Command::new(&self.launcher.program);
        command
            .args(&self.launcher.args)
            .envs(self.launcher.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::from(write_end))
            .stderr(Stdio::from(stderr_end))
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| AdbShellError::Spawn {
            program: self.launcher.program.clone(),
            source,
        })?;
        // The command holds our copies of the write end; EOF on the read end
        // must depend on the child alone.
        drop(command);

        let stdin = child.stdin.take().ok_or_else(|| {
            AdbShellError::Io(std::io::Error::other("child stdin was not captured"))
        })?;

        if let Some(status) = child.try_wait()? {
            return Err(AdbShellError::ExitedAtStart(status.to_string()));
        }

        let (tx, rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
        let pump = OutputPump::new(read_end, tx).spawn();

        Ok(RunningShell {
            child,
            stdin,
            output: rx,
            framing: Framing::default(),
            pump,
        })
    }

    /// Run one command and return its output.
    ///
    /// Returns everything the shell printed before the marker, with
    /// control sequences and trailing line endings removed. EOF, read
    /// errors, write errors and an expired deadline fail the call and stop
    /// the session: the child is gone, or a late marker would corrupt the
    /// next response.
    pub async fn execute(&mut self, command: &str) -> Result<String> {
        let timeout = self.timeout;
        let running = match self.running.as_mut() {
            Some(running) if self.state.can_execute() => running,
            _ => return Err(AdbShellError::NotRunning(self.state)),
        };

        let marker = self.markers.next_marker();
        let line = format!("{command}; echo {marker}\n");
        debug!(bytes = line.len(), "writing command");

        let written = async {
            running.stdin.write_all(line.as_bytes()).await?;
            running.stdin.flush().await
        }
        .await;
        if let Err(e) = written {
            // The child no longer reads its input.
            let err = AdbShellError::Io(e);
            self.record_error(&err);
            self.stop();
            return Err(err);
        }

        let deadline = Instant::now() + timeout;
        let read = read_until_marker(
            &mut running.output,
            &mut running.framing,
            marker.as_bytes(),
            deadline,
        )
        .await;
        match read {
            Ok(raw) => {
                let text = OutputSanitizer::strip_ansi(&raw);
                let text = OutputSanitizer::trim_line_endings(&text).to_string();
                debug!(bytes = text.len(), "command complete");
                Ok(text)
            }
            Err(ReadFailure::Timeout) => {
                let err = AdbShellError::Timeout(timeout);
                self.record_error(&err);
                warn!("no marker within {:?}; stopping session", timeout);
                self.stop();
                Err(err)
            }
            Err(ReadFailure::Eof) => {
                // The child closed its output; nothing more can be framed.
                let err = AdbShellError::UnexpectedEof;
                self.record_error(&err);
                self.stop();
                Err(err)
            }
            Err(ReadFailure::Io(e)) => {
                // The pump exits after reporting a read error.
                let err = AdbShellError::Io(e);
                self.record_error(&err);
                self.stop();
                Err(err)
            }
        }
    }

    /// Release the child and both pipe ends.
    ///
    /// Idempotent, never blocks, and valid in any state.
    pub fn stop(&mut self) {
        if let Some(mut running) = self.running.take() {
            drop(running.stdin);
            if let Err(e) = running.child.start_kill() {
                debug!("kill on stop: {}", e);
            }
            // The pump exits on its own once the child's end of the pipe closes.
            drop(running.output);
            drop(running.pump);
            info!("shell session stopped");
        }
        self.state = SessionState::Stopped;
    }

    fn record_error(&mut self, err: &AdbShellError) {
        warn!("shell session error: {}", err);
        self.last_error = Some(err.to_string());
    }
}

impl Drop for ShellSession {
    fn drop(&mut self) {
        self.stop();
    }
}

enum ReadFailure {
    Timeout,
    Eof,
    Io(std::io::Error),
}

/// Stream state carried between responses.
///
/// Bytes that follow a marker belong to the next response, except for the
/// line ending printed by the marker's own `echo`, which may arrive in a
/// later chunk.
#[derive(Debug, Default)]
struct Framing {
    pending: Vec<u8>,
    skip_eol: bool,
}

impl Framing {
    /// Drop the remainder of the previous marker line (`\r?\n`).
    fn strip_marker_eol(&mut self) {
        while self.skip_eol {
            match self.pending.first() {
                Some(b'\r') => {
                    self.pending.remove(0);
                }
                Some(b'\n') => {
                    self.pending.remove(0);
                    self.skip_eol = false;
                }
                Some(_) => self.skip_eol = false,
                None => break,
            }
        }
    }

    /// Split off the response if `marker` occurs at or after `scan_from`.
    fn take_response(&mut self, marker: &[u8], scan_from: usize) -> Option<Vec<u8>> {
        let pos = scan_from + find_subslice(&self.pending[scan_from..], marker)?;
        let rest = self.pending.split_off(pos + marker.len());
        self.pending.truncate(pos);
        let response = std::mem::replace(&mut self.pending, rest);
        self.skip_eol = true;
        self.strip_marker_eol();
        Some(response)
    }
}

/// Accumulate chunks until `marker` appears; return the bytes before it.
async fn read_until_marker(
    output: &mut mpsc::Receiver<Chunk>,
    framing: &mut Framing,
    marker: &[u8],
    deadline: Instant,
) -> std::result::Result<Vec<u8>, ReadFailure> {
    framing.strip_marker_eol();
    let mut scan_from = 0;

    loop {
        if let Some(response) = framing.take_response(marker, scan_from) {
            return Ok(response);
        }
        // Only the tail that could straddle the next chunk needs rescanning.
        scan_from = framing
            .pending
            .len()
            .saturating_sub(marker.len().saturating_sub(1));

        let chunk = match tokio::time::timeout_at(deadline, output.recv()).await {
            Err(_) => return Err(ReadFailure::Timeout),
            Ok(None) => return Err(ReadFailure::Eof),
            Ok(Some(Err(e))) => return Err(ReadFailure::Io(e)),
            Ok(Some(Ok(chunk))) => chunk,
        };
        framing.pending.extend_from_slice(&chunk);
        framing.strip_marker_eol();
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
