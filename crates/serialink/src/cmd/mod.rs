use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use serialink_channel::DEFAULT_BAUD_RATE;
use serialink_frame::{encode_request, FrameConfig};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod echo;
pub mod encode;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a single frame, optionally waiting for the reply.
    Send(SendArgs),
    /// Print every frame received.
    Listen(ListenArgs),
    /// Answer every frame with the same payload, from the slave side.
    Echo(EchoArgs),
    /// Print the wire bytes of a frame without opening a channel.
    Encode(EncodeArgs),
    /// Parse wire bytes and print the frame they hold.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format, config),
        Command::Listen(args) => listen::run(args, format, config),
        Command::Echo(args) => echo::run(args, config),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Channel selection shared by every command that opens one.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Unix socket path, or a serial device with --serial.
    pub path: PathBuf,
    /// Treat PATH as a serial device instead of a unix socket.
    #[arg(long)]
    pub serial: bool,
    /// Serial line speed (with --serial).
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

/// Request byte selection: raw, or built from action and role.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Raw request byte (e.g. 0xC1).
    #[arg(long, value_parser = parse_byte, conflicts_with_all = ["action", "slave"])]
    pub request: Option<u8>,
    /// Action code 0-15, sent with the 110 header tag.
    #[arg(long, value_parser = parse_byte)]
    pub action: Option<u8>,
    /// Mark the request as slave-originated.
    #[arg(long)]
    pub slave: bool,
}

impl RequestArgs {
    pub fn resolve(&self) -> CliResult<u8> {
        match (self.request, self.action) {
            (Some(request), _) => Ok(request),
            (None, Some(action)) if action <= 0x0F => Ok(encode_request(self.slave, action)),
            (None, Some(action)) => Err(CliError::new(
                USAGE,
                format!("action {action} does not fit in 4 bits"),
            )),
            (None, None) => Err(CliError::new(USAGE, "either --request or --action is required")),
        }
    }
}

/// Payload selection.
#[derive(Args, Debug, Clone)]
pub struct PayloadArgs {
    /// Payload as hex (e.g. "aa01ff"; spaces allowed).
    #[arg(long, conflicts_with = "value")]
    pub data: Option<String>,
    /// Single-byte payload.
    #[arg(long, value_parser = parse_byte)]
    pub value: Option<u8>,
}

impl PayloadArgs {
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(value) = self.value {
            return Ok(vec![value]);
        }
        match &self.data {
            Some(data) => parse_hex(data),
            None => Err(CliError::new(USAGE, "either --data or --value is required")),
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub request: RequestArgs,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Wait for one reply frame and print it.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub request: RequestArgs,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire bytes as hex (spaces allowed).
    pub wire: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a byte written as decimal (`193`) or hex (`0xC1`).
pub fn parse_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("not a byte value: {input}"))
}

pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let compact: String = input.split_whitespace().collect();
    hex::decode(&compact).map_err(|err| CliError::new(USAGE, format!("invalid hex: {err}")))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
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
        _ => Ok(Duration::from_secs(value)),
    }
}
