//! Serial port sensor link adapter
//!
//! This adapter implements the SensorLink trait for an HMT333 attached to
//! a local serial port (directly, or through an RS-422 radio bridge).

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use serialport::{FlowControl, SerialPortType};
use tracing::{debug, info, warn};

use crate::error::LinkError;
use crate::ports::link::SensorLink;
use crate::protocol::{ECHO_OFF, SEND};

/// Longest line we keep; anything beyond is dropped up to the newline
const MAX_LINE_LEN: usize = 256;

/// Where and how to reach the sensor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialSettings {
    /// Device path, e.g. `/dev/ttyUSB0`
    pub port: String,
    /// Baud rate of the sensor (or radio bridge)
    pub baud: u32,
    /// Longest wait for one response line
    pub timeout: Duration,
}

/// Byte stream to the sensor
pub trait PortIo: Read + Write + Send {}

impl<T: Read + Write + Send + ?Sized> PortIo for T {}

/// Opens the byte stream described by the settings
pub type Connector = Box<dyn FnMut(&SerialSettings) -> Result<Box<dyn PortIo>, LinkError> + Send>;

/// Serial link to the sensor
///
/// The port is opened on demand: a link that fails to open, or that hits
/// an I/O error, reports a [`LinkError`] for that cycle and reconnects on
/// the next request. Echo is switched off every time the port is opened.
pub struct SerialLink {
    settings: SerialSettings,
    connect: Connector,
    port: Option<Box<dyn PortIo>>,
}

impl SerialLink {
    /// Create a link without opening the port yet
    pub fn new(settings: SerialSettings) -> Self {
        Self::with_connector(settings, Box::new(open_serial_port))
    }

    /// Create a link whose port is opened by `connect` instead of the
    /// serial driver
    pub fn with_connector(settings: SerialSettings, connect: Connector) -> Self {
        Self {
            settings,
            connect,
            port: None,
        }
    }

    /// Create a link and open the port immediately
    pub fn open(settings: SerialSettings) -> Result<Self, LinkError> {
        let mut link = Self::new(settings);
        link.connected_port()?;
        Ok(link)
    }

    /// The open port, opening it (and disabling echo) if needed
    fn connected_port(&mut self) -> Result<&mut Box<dyn PortIo>, LinkError> {
        if self.port.is_none() {
            let mut opened = (self.connect)(&self.settings)?;
            write_command(opened.as_mut(), ECHO_OFF)?;
            info!(
                port = %self.settings.port,
                baud = self.settings.baud,
                "serial link open, echo switched off"
            );
            self.port = Some(opened);
        }

        self.port.as_mut().ok_or(LinkError::NotConnected)
    }

    fn exchange(&mut self, command: &[u8], expect_reply: bool) -> Result<Option<String>, LinkError> {
        let timeout = self.settings.timeout;
        let port = self.connected_port()?;
        write_command(port.as_mut(), command)?;
        if expect_reply {
            read_line(port.as_mut(), timeout).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Run one exchange, dropping the port after an I/O failure
    fn exchange_or_disconnect(
        &mut self,
        command: &[u8],
        expect_reply: bool,
    ) -> Result<Option<String>, LinkError> {
        let result = self.exchange(command, expect_reply);
        if let Err(LinkError::Io(ref e)) = result {
            warn!(port = %self.settings.port, error = %e, "serial I/O failed, will reopen on next poll");
            self.port = None;
        }
        result
    }
}

fn open_serial_port(settings: &SerialSettings) -> Result<Box<dyn PortIo>, LinkError> {
    let port = serialport::new(settings.port.as_str(), settings.baud)
        .timeout(settings.timeout)
        .flow_control(FlowControl::None)
        .open()
        .map_err(|source| LinkError::Open {
            port: settings.port.clone(),
            source,
        })?;
    Ok(Box::new(port))
}

fn write_command(port: &mut dyn PortIo, command: &[u8]) -> Result<(), LinkError> {
    port.write_all(command)?;
    port.flush()?;
    Ok(())
}

impl SensorLink for SerialLink {
    fn request(&mut self) -> Result<String, LinkError> {
        let line = self.exchange_or_disconnect(SEND, true)?;
        debug!(port = %self.settings.port, "sent SEND command");
        line.ok_or(LinkError::Timeout)
    }

    fn disable_echo(&mut self) -> Result<(), LinkError> {
        self.exchange_or_disconnect(ECHO_OFF, false).map(|_| ())
    }

    fn endpoint(&self) -> &str {
        &self.settings.port
    }
}

/// Read one `\n`-terminated line, waiting at most `timeout` overall.
///
/// A partial line is returned if the deadline passes after some bytes have
/// arrived; nothing at all is a [`LinkError::Timeout`], while a bare
/// newline gives an empty line. Trailing `\r` is
/// stripped and invalid UTF-8 is replaced.
pub fn read_line<R: Read + ?Sized>(reader: &mut R, timeout: Duration) -> Result<String, LinkError> {
    let deadline = Instant::now() + timeout;
    let mut rx_buf = Vec::with_capacity(32);
    let mut byte = [0u8; 1];
    let mut terminated = false;

    loop {
        match reader.read(&mut byte) {
            Ok(1) => {
                if byte[0] == b'\n' {
                    terminated = true;
                    break;
                }
                if rx_buf.len() < MAX_LINE_LEN {
                    rx_buf.push(byte[0]);
                }
            }
            Ok(_) => {
                // No data; give up once the deadline has passed
                if Instant::now() >= deadline {
                    break;
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    if rx_buf.is_empty() && !terminated {
        return Err(LinkError::Timeout);
    }

    let line = String::from_utf8_lossy(&rx_buf);
    Ok(line.trim_end_matches('\r').to_string())
}

/// Describe the serial ports visible on this machine
pub fn available_ports() -> Result<Vec<String>, serialport::Error> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| match &port.port_type {
            SerialPortType::UsbPort(info) => format!(
                "{} - USB (VID: 0x{:04x}, PID: 0x{:04x}){}",
                port.port_name,
                info.vid,
                info.pid,
                info.product
                    .as_deref()
                    .map(|p| format!(" {}", p))
                    .unwrap_or_default()
            ),
            SerialPortType::BluetoothPort => format!("{} - Bluetooth", port.port_name),
            SerialPortType::PciPort => format!("{} - PCI", port.port_name),
            SerialPortType::Unknown => format!("{} - Unknown", port.port_name),
        })
        .collect())
}
