//! adb-shellfs binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use adb_shellfs::cli::{self, Args};
use adb_shellfs::config::Config;
use adb_shellfs::device::list_devices;
use adb_shellfs::{logging, AdbDevice, DeviceInfo, DirectoryEntry, ListingResponse};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'adb-shellfs --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    if logging::try_init_with_level(config.log_filter()).is_err() {
        eprintln!("warning: logging already initialized");
    }
    debug!("adb-shellfs v{}", env!("CARGO_PKG_VERSION"));

    match run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(e.kind().errno().clamp(1, 255) as u8)
        }
    }
}

async fn run(args: &Args, config: &Config) -> adb_shellfs::Result<()> {
    let locator = Arc::new(config.locator());

    if args.devices {
        let devices = list_devices(&locator, config.device_options().oneshot_timeout).await?;
        print_devices(&devices, args.json);
        return Ok(());
    }

    let mut device = AdbDevice::new(locator, config.device_options());
    device.connect().await?;
    info!(path = %device.current_path(), "shell ready");

    let path = match args.path {
        Some(ref path) => path.clone(),
        None => device.current_path().to_string(),
    };
    let listing = device.list_directory(&path).await;
    device.disconnect();

    print_listing(&listing?, args.json);
    Ok(())
}

fn print_devices(devices: &[DeviceInfo], json: bool) {
    if json {
        print_json(devices);
        return;
    }
    for device in devices {
        println!("{:<24} {}", device.serial, device.name);
    }
}

fn print_listing(listing: &ListingResponse, json: bool) {
    if json {
        print_json(listing);
        return;
    }
    println!("{}:", listing.path);
    for entry in &listing.entries {
        println!("{}", format_entry(entry));
    }
}

fn format_entry(entry: &DirectoryEntry) -> String {
    let mut line = format!(
        "{} {:>3} {:<8} {:<8} {:>10} {} {}",
        entry.permissions,
        entry.links,
        entry.owner,
        entry.group,
        entry.size,
        entry.modified.format("%Y-%m-%d %H:%M"),
        entry.name,
    );
    if let Some(ref target) = entry.target {
        line.push_str(" -> ");
        line.push_str(target);
    }
    if entry.is_dir() {
        line.push('/');
    }
    line
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: failed to encode JSON: {}", e),
    }
}
