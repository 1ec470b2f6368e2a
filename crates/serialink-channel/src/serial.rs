use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use crate::error::{ChannelError, Result};
use crate::traits::Channel;
use crate::DEFAULT_BAUD_RATE;

/// How to open a serial device.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    /// Device path (e.g. `/dev/ttyUSB0`, `COM3`).
    pub path: String,
    /// Line speed in baud. Default: 9600.
    pub baud_rate: u32,
    /// Timeout for the underlying blocking read/write calls.
    pub timeout: Duration,
}

impl SerialSettings {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(100),
        }
    }

    #[must_use]
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A [`Channel`] over a serial device (8N1, no flow control).
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Open the device described by `settings`.
    pub fn open(settings: &SerialSettings) -> Result<Self> {
        let port = serialport::new(&settings.path, settings.baud_rate)
            .timeout(settings.timeout)
            .open()
            .map_err(|source| ChannelError::Open {
                path: settings.path.clone(),
                source,
            })?;
        debug!(path = %settings.path, baud = settings.baud_rate, "opened serial device");
        Ok(Self { port })
    }

    /// Wrap an already opened port.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Device name reported by the driver, if any.
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Channel for SerialChannel {
    fn available(&mut self) -> Result<usize> {
        let queued = self.port.bytes_to_read().map_err(std::io::Error::from)?;
        Ok(queued as usize)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.available()? == 0 {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.port.write_all(&[byte])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.port.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("name", &self.port.name())
            .finish()
    }
}
