use std::io::{ErrorKind, Read};
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use super::{ByteSource, SourceError};

const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Headset connected over a serial port (Bluetooth SPP or USB dongle).
pub struct SerialSource {
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    /// Open `port_name` (e.g. `/dev/rfcomm0` or `COM3`) at `baud_rate`.
    ///
    /// # Errors
    /// Returns `SourceError` when the port cannot be opened.
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, SourceError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()?;
        debug!(port = port_name, baud_rate, "serial port opened");
        Ok(Self { port })
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl ByteSource for SerialSource {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        if self.port.bytes_to_read()? == 0 {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Names of the serial ports visible on this machine.
///
/// # Errors
/// Returns `SourceError` when the platform port enumeration fails.
pub fn available_ports() -> Result<Vec<String>, SourceError> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|port| port.port_name).collect())
}
