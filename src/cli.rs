//! Command-line interface for adb-shellfs.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Device serial (overrides config file and environment).
    pub serial: Option<String>,
    /// Path to the adb executable.
    pub adb: Option<String>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Per-command timeout in seconds.
    pub timeout: Option<u64>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// List attached devices instead of a directory.
    pub devices: bool,
    /// Emit JSON instead of the human-readable table.
    pub json: bool,
    /// Remote directory to list; the shell's start directory when unset.
    pub path: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('s') | Long("serial") => {
                result.serial = Some(parser.value()?.parse()?);
            }
            Short('a') | Long("adb") => {
                result.adb = Some(parser.value()?.parse()?);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("timeout") => {
                let value: String = parser.value()?.parse()?;
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|&secs| secs > 0)
                    .ok_or(ArgsError::InvalidValue("timeout", value))?;
                result.timeout = Some(secs);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Short('d') | Long("devices") => {
                result.devices = true;
            }
            Long("json") => {
                result.json = true;
            }
            Value(val) if result.path.is_none() => {
                result.path = Some(val.string()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"adb-shellfs {version}
Browse an Android device's filesystem over a persistent adb shell

USAGE:
    adb-shellfs [OPTIONS] [PATH]

ARGS:
    [PATH]                  Remote directory to list [default: shell start directory]

OPTIONS:
    -s, --serial <SERIAL>   Device serial (see `adb devices`)
    -a, --adb <PATH>        Path to the adb executable
    -c, --config <FILE>     Path to configuration file (JSON)
    -t, --timeout <SECS>    Per-command timeout in seconds [default: 30]
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -d, --devices           List attached devices and exit
        --json              Print JSON instead of a table
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    ADB_SHELLFS_ADB_PATH    adb executable (overrides config)
    ADB_SHELLFS_SERIAL      Device serial (overrides config)
    ANDROID_SERIAL          Device serial, when ADB_SHELLFS_SERIAL is unset
    ADB_SHELLFS_TIMEOUT     Per-command timeout in seconds (overrides config)
    ADB_SHELLFS_LOG_LEVEL   Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # List the start directory of the only attached device
    adb-shellfs

    # List a directory on a specific device
    adb-shellfs -s emulator-5554 /sdcard/DCIM

    # Machine-readable output
    adb-shellfs --json /sdcard

    # Show attached devices
    adb-shellfs --devices
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("adb-shellfs {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("adb-shellfs")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert_eq!(result.serial, None);
        assert_eq!(result.path, None);
        assert_eq!(result.timeout, None);
        assert!(!result.devices);
        assert!(!result.json);
    }

    #[test]
    fn test_serial_and_path() {
        let result = parse_args_from(args(&["-s", "emulator-5554", "/sdcard/DCIM"])).unwrap();
        assert_eq!(result.serial.as_deref(), Some("emulator-5554"));
        assert_eq!(result.path.as_deref(), Some("/sdcard/DCIM"));
    }

    #[test]
    fn test_long_options() {
        let result = parse_args_from(args(&[
            "--serial",
            "R58M123",
            "--adb",
            "/opt/adb",
            "--timeout",
            "15",
        ]))
        .unwrap();
        assert_eq!(result.serial.as_deref(), Some("R58M123"));
        assert_eq!(result.adb.as_deref(), Some("/opt/adb"));
        assert_eq!(result.timeout, Some(15));
    }

    #[test]
    fn test_config_file() {
        let result = parse_args_from(args(&["-c", "/etc/adb-shellfs.json"])).unwrap();
        assert_eq!(result.config, Some(PathBuf::from("/etc/adb-shellfs.json")));
    }

    #[test]
    fn test_devices_and_json() {
        let result = parse_args_from(args(&["-d", "--json"])).unwrap();
        assert!(result.devices);
        assert!(result.json);
    }

    #[test]
    fn test_help_flag() {
        let result = parse_args_from(args(&["-h"])).unwrap();
        assert!(result.help);

        let result = parse_args_from(args(&["--help"])).unwrap();
        assert!(result.help);
    }

    #[test]
    fn test_version_flag() {
        let result = parse_args_from(args(&["-V"])).unwrap();
        assert!(result.version);

        let result = parse_args_from(args(&["--version"])).unwrap();
        assert!(result.version);
    }

    #[test]
    fn test_log_level() {
        let result = parse_args_from(args(&["-l", "debug"])).unwrap();
        assert_eq!(result.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(parse_args_from(args(&["-t", "soon"])).is_err());
        assert!(parse_args_from(args(&["-t", "0"])).is_err());
    }

    #[test]
    fn test_second_path_rejected() {
        let result = parse_args_from(args(&["/sdcard", "/data"]));
        assert!(matches!(result, Err(ArgsError::UnexpectedArgument(a)) if a == "/data"));
    }

    #[test]
    fn test_unknown_option() {
        assert!(parse_args_from(args(&["--port", "3000"])).is_err());
    }
}
