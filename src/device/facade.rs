//! Device facade: one persistent shell per device plus one-shot adb calls.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::locator::AdbLocator;
use super::oneshot::{AdbCommand, AdbOutput, DEFAULT_ONESHOT_TIMEOUT};
use super::state::ConnectionState;
use crate::error::AdbShellError;
use crate::output::OutputSanitizer;
use crate::protocol::{
    build_cd_command, build_listing_command, parse_listing_response, quote_path, ErrorKind,
    ListingResponse,
};
use crate::session::{ShellLauncher, ShellSession, DEFAULT_COMMAND_TIMEOUT};
use crate::Result;

/// Phrases adb prints in its transfer summary on success.
const TRANSFER_SUCCESS_PHRASES: &[&str] = &[
    "file pulled",
    "files pulled",
    "file pushed",
    "files pushed",
    "skipped",
];

/// Settings for a device facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOptions {
    /// Device serial; `None` targets the only attached device.
    pub serial: Option<String>,
    /// Deadline for one command on the persistent shell.
    pub command_timeout: Duration,
    /// Deadline for one-shot adb invocations.
    pub oneshot_timeout: Duration,
}

impl DeviceOptions {
    pub fn new(serial: Option<String>) -> Self {
        Self {
            serial,
            ..Self::default()
        }
    }
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            serial: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            oneshot_timeout: DEFAULT_ONESHOT_TIMEOUT,
        }
    }
}

/// A connected view of one Android device's filesystem.
///
/// Owns exactly one [`ShellSession`]. Directory operations go through the
/// session; transfers run as separate `adb` processes. One facade per
/// device; facades share nothing but the [`AdbLocator`].
pub struct AdbDevice {
    locator: Arc<AdbLocator>,
    options: DeviceOptions,
    launcher: Option<ShellLauncher>,
    state: ConnectionState,
    session: Option<ShellSession>,
    current_path: String,
}

impl AdbDevice {
    /// Create a disconnected facade.
    pub fn new(locator: Arc<AdbLocator>, options: DeviceOptions) -> Self {
        Self {
            locator,
            options,
            launcher: None,
            state: ConnectionState::Disconnected,
            session: None,
            current_path: "/".to_string(),
        }
    }

    /// Drive a custom shell instead of `adb shell`.
    pub fn with_launcher(mut self, launcher: ShellLauncher) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn serial(&self) -> Option<&str> {
        self.options.serial.as_deref()
    }

    pub fn options(&self) -> &DeviceOptions {
        &self.options
    }

    /// Cached working directory from the last successful `pwd`.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Start the shell and learn the initial working directory.
    ///
    /// Any failure (adb not found, shell start failure, empty `pwd`)
    /// leaves the facade disconnected.
    pub async fn connect(&mut self) -> Result<()> {
        if self.state.is_connected() {
            return Ok(());
        }
        self.state.transition_to(ConnectionState::Connecting)?;

        match self.open_session().await {
            Ok((session, path)) => {
                info!(serial = ?self.options.serial, path = %path, "device connected");
                self.session = Some(session);
                self.current_path = path;
                self.state.transition_to(ConnectionState::Connected)
            }
            Err(e) => {
                warn!(serial = ?self.options.serial, "connect failed: {}", e);
                self.state.transition_to(ConnectionState::Disconnected)?;
                Err(e)
            }
        }
    }

    async fn open_session(&self) -> Result<(ShellSession, String)> {
        let launcher = match &self.launcher {
            Some(launcher) => launcher.clone(),
            None => {
                let adb = self.locator.resolve().await?;
                ShellLauncher::adb_shell(adb, self.options.serial.as_deref())
            }
        };

        let mut session = ShellSession::new(launcher).with_timeout(self.options.command_timeout);
        session.start().await?;

        let pwd = session.execute("pwd").await?;
        let path = OutputSanitizer::trim_line_endings(&pwd);
        if path.is_empty() {
            session.stop();
            return Err(AdbShellError::EmptyWorkingDirectory);
        }
        Ok((session, path.to_string()))
    }

    /// Stop the shell. Safe to call in any state.
    pub fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        if self.state.is_connected() {
            info!(serial = ?self.options.serial, "device disconnected");
        }
        self.state = ConnectionState::Disconnected;
    }

    async fn ensure_connected(&mut self) -> Result<()> {
        if self.state.is_connected() && self.session.as_ref().is_some_and(ShellSession::is_running) {
            return Ok(());
        }
        self.disconnect();
        self.connect().await.map_err(|e| {
            debug!("reconnect failed: {}", e);
            AdbShellError::NotConnected
        })
    }

    /// Run a command on the persistent shell, surfacing transport failures.
    pub async fn try_run_shell_command(&mut self, command: &str) -> Result<String> {
        self.ensure_connected().await?;
        let session = self.session.as_mut().ok_or(AdbShellError::NotConnected)?;

        let result = session.execute(command).await;
        if !session.is_running() {
            // The session stopped itself after a transport failure.
            self.disconnect();
        }
        result
    }

    /// Run a command on the persistent shell.
    ///
    /// Transport failures yield an empty string; use
    /// [`try_run_shell_command`](Self::try_run_shell_command) to tell them
    /// apart from commands that print nothing.
    pub async fn run_shell_command(&mut self, command: &str) -> String {
        match self.try_run_shell_command(command).await {
            Ok(output) => output,
            Err(e) => {
                warn!("shell command failed: {}", e);
                String::new()
            }
        }
    }

    /// Run `adb [-s serial] <args...>` as a separate process.
    pub async fn run_adb_command<I, S>(&self, args: I) -> Result<AdbOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let adb = self.locator.resolve().await?;
        AdbCommand::new(adb)
            .serial(self.options.serial.as_deref())
            .args(args)
            .timeout(self.options.oneshot_timeout)
            .run()
            .await
    }

    /// Live `pwd`, falling back to `/` when the shell cannot answer.
    pub async fn current_working_directory(&mut self) -> String {
        if !self.is_connected() {
            return "/".to_string();
        }
        match self.try_run_shell_command("pwd").await {
            Ok(pwd) if !pwd.is_empty() => pwd,
            _ => "/".to_string(),
        }
    }

    /// Change the shell's directory.
    ///
    /// Returns `Ok(false)` when `cd` failed; the cached path is then left
    /// unchanged.
    pub async fn set_directory(&mut self, path: &str) -> Result<bool> {
        if !self.is_connected() {
            return Err(AdbShellError::NotConnected);
        }
        let output = self.try_run_shell_command(&build_cd_command(path)).await?;
        let new_path = OutputSanitizer::trim_line_endings(&output);
        if new_path.is_empty() {
            debug!("cd {} failed", path);
            return Ok(false);
        }
        self.current_path = new_path.to_string();
        Ok(true)
    }

    /// List a directory in one round trip and move the cached path there.
    ///
    /// If `cd` fails the listing is of the previous directory and the
    /// returned path says so.
    pub async fn list_directory(&mut self, path: &str) -> Result<ListingResponse> {
        if !self.is_connected() {
            return Err(AdbShellError::NotConnected);
        }
        let raw = self.try_run_shell_command(&build_listing_command(path)).await?;
        let mut listing = parse_listing_response(&raw)?;
        if listing.path.is_empty() {
            listing.path = path.to_string();
        }
        self.current_path = listing.path.clone();
        Ok(listing)
    }

    /// Copy a remote file to the host.
    pub async fn pull_file(&mut self, device_path: &str, local_path: &str) -> Result<()> {
        self.transfer("pull", device_path, local_path).await
    }

    /// Copy a host file to the device.
    pub async fn push_file(&mut self, local_path: &str, device_path: &str) -> Result<()> {
        self.transfer("push", local_path, device_path).await
    }

    /// Copy a remote directory tree to the host.
    pub async fn pull_directory(&mut self, device_path: &str, local_path: &str) -> Result<()> {
        self.transfer("pull", device_path, local_path).await
    }

    /// Copy a host directory tree to the device.
    pub async fn push_directory(&mut self, local_path: &str, device_path: &str) -> Result<()> {
        self.transfer("push", local_path, device_path).await
    }

    /// Remove a remote file.
    pub async fn delete_file(&mut self, device_path: &str) -> Result<()> {
        self.shell_operation(&format!("rm {}", quote_path(device_path))).await
    }

    /// Remove a remote directory tree.
    pub async fn delete_directory(&mut self, device_path: &str) -> Result<()> {
        self.shell_operation(&format!("rm -rf {}", quote_path(device_path))).await
    }

    /// Create a remote directory and any missing parents.
    pub async fn create_directory(&mut self, device_path: &str) -> Result<()> {
        self.shell_operation(&format!("mkdir -p {}", quote_path(device_path))).await
    }

    async fn shell_operation(&mut self, command: &str) -> Result<()> {
        self.ensure_connected().await?;
        let output = self.try_run_shell_command(command).await?;
        check_shell_output(output)
    }

    async fn transfer(&mut self, verb: &str, from: &str, to: &str) -> Result<()> {
        self.ensure_connected().await?;
        let output = self.run_adb_command([verb, from, to]).await?;
        check_transfer_output(output)
    }
}

impl Drop for AdbDevice {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Shell file operations print nothing on success.
fn check_shell_output(output: String) -> Result<()> {
    if output.is_empty() {
        return Ok(());
    }
    Err(AdbShellError::Command {
        kind: ErrorKind::from_text(&output),
        message: output,
    })
}

fn check_transfer_output(output: AdbOutput) -> Result<()> {
    let summary_ok = TRANSFER_SUCCESS_PHRASES
        .iter()
        .any(|phrase| output.text.contains(phrase));
    if output.success() || summary_ok {
        return Ok(());
    }
    Err(AdbShellError::Command {
        kind: ErrorKind::from_text(&output.text),
        message: output.text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(text: &str, code: i32) -> AdbOutput {
        AdbOutput {
            text: text.to_string(),
            exit_code: Some(code),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_shell_output_classification() {
        assert!(check_shell_output(String::new()).is_ok());

        let err = check_shell_output("mkdir: '/system/x': Read-only file system".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadOnlyFilesystem);

        let err = check_shell_output("rm: x: Directory not empty".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotEmpty);

        let err = check_shell_output("weird".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GenericIO);
    }

    #[test]
    fn test_transfer_classification() {
        assert!(check_transfer_output(output("/sdcard/a.jpg: 1 file pulled, 0 skipped.", 0)).is_ok());
        assert!(check_transfer_output(output("", 0)).is_ok());
        assert!(check_transfer_output(output("3 files pushed, 0 skipped. 9.1 MB/s", 0)).is_ok());

        let err = check_transfer_output(output(
            "adb: error: failed to stat remote object '/sdcard/nope': No such file or directory",
            1,
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = check_transfer_output(output("adb: error: no devices/emulators found", 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceNotFound);
    }

    #[test]
    fn test_default_options() {
        let options = DeviceOptions::new(Some("emulator-5554".into()));
        assert_eq!(options.serial.as_deref(), Some("emulator-5554"));
        assert_eq!(options.command_timeout, DEFAULT_COMMAND_TIMEOUT);
        assert_eq!(options.oneshot_timeout, DEFAULT_ONESHOT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_connect_without_adb_stays_disconnected() {
        let locator = Arc::new(AdbLocator::with_candidates(["/nonexistent/adb-shellfs/adb"]));
        let mut device = AdbDevice::new(locator, DeviceOptions::default());

        let err = device.connect().await.unwrap_err();
        assert!(matches!(err, AdbShellError::AdbNotFound));
        assert_eq!(device.state(), ConnectionState::Disconnected);
        assert_eq!(device.current_path(), "/");
    }

    #[tokio::test]
    async fn test_operations_require_connection() {
        let locator = Arc::new(AdbLocator::with_candidates(["/nonexistent/adb-shellfs/adb"]));
        let mut device = AdbDevice::new(locator, DeviceOptions::default());

        assert!(matches!(
            device.list_directory("/sdcard").await,
            Err(AdbShellError::NotConnected)
        ));
        let err = device.create_directory("/sdcard/new").await.unwrap_err();
        assert_eq!(err.kind().errno(), libc::EIO);
        assert_eq!(device.run_shell_command("ls").await, "");
        assert_eq!(device.current_working_directory().await, "/");
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut device = AdbDevice::new(Arc::new(AdbLocator::fixed("adb")), DeviceOptions::default());
        device.disconnect();
        device.disconnect();
        assert_eq!(device.state(), ConnectionState::Disconnected);
    }
}
