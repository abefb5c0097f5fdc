use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use wirelink_channel::LinkPort;
use wirelink_command::CommandClient;

use crate::exit::{channel_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod echo;
pub mod flash_read;
pub mod fw_version;
pub mod monitor;
pub mod reboot;
pub mod uptime;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Round-trip a payload through the device echo command.
    Echo(EchoArgs),
    /// Print the device firmware build hash.
    FwVersion(PortArgs),
    /// Print device uptime in milliseconds.
    Uptime(PortArgs),
    /// Dump a flash region.
    FlashRead(FlashReadArgs),
    /// Request a device reboot.
    Reboot(PortArgs),
    /// Decode a captured byte stream offline.
    Decode(DecodeArgs),
    /// Print reassembled messages as they arrive.
    Monitor(MonitorArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Echo(args) => echo::run(args, format),
        Command::FwVersion(args) => fw_version::run(args, format),
        Command::Uptime(args) => uptime::run(args, format),
        Command::FlashRead(args) => flash_read::run(args, format),
        Command::Reboot(args) => reboot::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct PortArgs {
    /// Device path (an already-configured serial port or socket).
    pub port: PathBuf,
    /// Per-request timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "1s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Payload string.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FlashReadArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Start address (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_u32)]
    pub addr: u32,
    /// Number of bytes to read (1-256).
    #[arg(long)]
    pub len: u16,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file; stdin when omitted.
    pub file: Option<PathBuf>,
    /// Also print decode statistics.
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Device path.
    pub port: PathBuf,
    /// Exit after N reassembled messages.
    #[arg(long)]
    pub count: Option<usize>,
}

pub(crate) fn open_client(args: &PortArgs) -> CliResult<CommandClient<LinkPort>> {
    let timeout = parse_duration(&args.timeout)?;
    let port = LinkPort::open(&args.port).map_err(|err| channel_error("open failed", err))?;
    Ok(CommandClient::with_timeout(port, timeout))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

fn parse_u32(input: &str) -> Result<u32, String> {
    let input = input.trim();
    let parsed = if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        input.parse()
    };
    parsed.map_err(|_| format!("invalid number: {input}"))
}
