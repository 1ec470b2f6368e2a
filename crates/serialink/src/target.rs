//! Opening the channel a command talks over.

use serialink_channel::{Channel, UnixDomainSocket};

use crate::cmd::TargetArgs;
use crate::exit::{channel_error, CliResult};

/// Where incoming frames come from for `listen` and `echo`.
pub enum Inbound {
    /// A bound socket; each accepted connection is served in turn.
    Socket(UnixDomainSocket),
    /// A serial device, opened once and served until interrupted.
    Serial(Box<dyn Channel>),
}

/// Open the target as the initiating side: connect the socket or open the device.
pub fn connect(target: &TargetArgs) -> CliResult<Box<dyn Channel>> {
    if target.serial {
        return open_serial(target);
    }
    let channel = UnixDomainSocket::connect(&target.path)
        .map_err(|err| channel_error("connect failed", err))?;
    Ok(Box::new(channel))
}

/// Open the target as the listening side: bind the socket or open the device.
pub fn listen(target: &TargetArgs) -> CliResult<Inbound> {
    if target.serial {
        return Ok(Inbound::Serial(open_serial(target)?));
    }
    let listener =
        UnixDomainSocket::bind(&target.path).map_err(|err| channel_error("bind failed", err))?;
    Ok(Inbound::Socket(listener))
}

/// Human-readable label for output records.
pub fn describe(target: &TargetArgs) -> String {
    if target.serial {
        format!("serial:{}@{}", target.path.display(), target.baud)
    } else {
        format!("unix:{}", target.path.display())
    }
}

#[cfg(feature = "serial")]
fn open_serial(target: &TargetArgs) -> CliResult<Box<dyn Channel>> {
    use serialink_channel::{SerialChannel, SerialSettings};

    let settings =
        SerialSettings::new(target.path.to_string_lossy().into_owned()).baud_rate(target.baud);
    let channel =
        SerialChannel::open(&settings).map_err(|err| channel_error("open failed", err))?;
    Ok(Box::new(channel))
}

#[cfg(not(feature = "serial"))]
fn open_serial(_target: &TargetArgs) -> CliResult<Box<dyn Channel>> {
    Err(crate::exit::CliError::new(
        crate::exit::USAGE,
        "serial support not compiled in (enable the `serial` feature)",
    ))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn target(path: &str, serial: bool) -> TargetArgs {
        TargetArgs {
            path: PathBuf::from(path),
            serial,
            baud: 9600,
        }
    }

    #[test]
    fn describes_targets() {
        assert_eq!(describe(&target("/tmp/a.sock", false)), "unix:/tmp/a.sock");
        assert_eq!(
            describe(&target("/dev/ttyUSB0", true)),
            "serial:/dev/ttyUSB0@9600"
        );
    }

    #[cfg(not(feature = "serial"))]
    #[test]
    fn serial_target_needs_serial_feature() {
        let err = match connect(&target("/dev/ttyUSB0", true)) {
            Ok(_) => panic!("serial support is compiled out"),
            Err(err) => err,
        };
        assert_eq!(err.code, crate::exit::USAGE);
        assert!(matches!(
            listen(&target("/dev/ttyUSB0", true)),
            Err(crate::exit::CliError { code: crate::exit::USAGE, .. })
        ));
    }

    #[test]
    fn baud_defaults_without_serial_support() {
        use clap::Parser;

        #[derive(Parser)]
        struct TargetOnly {
            #[command(flatten)]
            target: TargetArgs,
        }

        let parsed = TargetOnly::try_parse_from(["serialink", "/dev/ttyS0", "--serial"]).unwrap();
        assert_eq!(parsed.target.baud, serialink_channel::DEFAULT_BAUD_RATE);
    }

    #[test]
    fn connect_to_missing_socket_fails() {
        let path = std::env::temp_dir().join(format!(
            "serialink-target-missing-{}.sock",
            std::process::id()
        ));
        let err = match connect(&target(&path.to_string_lossy(), false)) {
            Ok(_) => panic!("connect should fail"),
            Err(err) => err,
        };
        assert_eq!(err.code, crate::exit::FAILURE);
    }
}
