mod cmd;
mod exit;
mod logging;
mod output;
mod target;

use clap::Parser;
use serialink_frame::FrameConfig;

use crate::cmd::{parse_duration, Command};
use crate::exit::CliResult;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "serialink", version, about = "Checksummed framing over serial links")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Delay between checks for incoming bytes (e.g. 25ms).
    #[arg(
        long,
        value_name = "DURATION",
        default_value = "25ms",
        env = "SERIALINK_POLL_INTERVAL",
        global = true
    )]
    poll_interval: String,

    /// Give up on a reply after this long (e.g. 2s, 500ms). Default: wait forever.
    #[arg(long, value_name = "DURATION", env = "SERIALINK_TIMEOUT", global = true)]
    timeout: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn frame_config(&self) -> CliResult<FrameConfig> {
        let mut config =
            FrameConfig::default().with_poll_interval(parse_duration(&self.poll_interval)?);
        if let Some(timeout) = &self.timeout {
            config = config.with_timeout(parse_duration(timeout)?);
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cli
        .frame_config()
        .and_then(|config| cmd::run(cli.command, format, config));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "serialink",
            "send",
            "/tmp/link.sock",
            "--action",
            "3",
            "--data",
            "aa01",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "serialink",
            "send",
            "/tmp/link.sock",
            "--request",
            "0xC1",
            "--data",
            "aa",
            "--value",
            "1",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_request_with_action() {
        let err = Cli::try_parse_from([
            "serialink",
            "encode",
            "--request",
            "0xC1",
            "--action",
            "2",
            "--data",
            "aa",
        ])
        .expect_err("raw request and action should conflict");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_serial_listen() {
        let cli = Cli::try_parse_from([
            "serialink",
            "listen",
            "/dev/ttyUSB0",
            "--serial",
            "--baud",
            "115200",
            "--count",
            "2",
        ])
        .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert!(args.target.serial);
                assert_eq!(args.target.baud, 115_200);
                assert_eq!(args.count, Some(2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn builds_frame_config_from_globals() {
        let cli = Cli::try_parse_from([
            "serialink",
            "--poll-interval",
            "5ms",
            "--timeout",
            "2s",
            "decode",
            "c10201c2",
        ])
        .expect("globals should parse");

        let config = cli.frame_config().expect("durations should parse");
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert_eq!(config.timeout, Some(Duration::from_secs(2)));
    }
}
