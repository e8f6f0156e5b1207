//! # Serial Communication Module
//!
//! Handles the serial port a SiRF receiver is connected to.
//!
//! This module handles:
//! - Opening the port in raw 8N1 mode at a rate from the rate table
//! - Blocking reads that fill the request until the line goes quiet
//! - Reporting the port's current baud rate and timeout
//! - Exposing the port as a [`Channel`] for the framing engine

use std::io::{self, Read, Write};
use std::time::Duration;
use tokio_serial::SerialPort;
use tracing::{debug, info};

use crate::channel::Channel;
use crate::config::SerialConfig;
use crate::error::{Result, SirfLinkError};

/// Baud rates the port can be programmed with
pub const BAUD_RATES: &[u32] = &[
    50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 38400, 57600,
    115200, 230400,
];

/// Check `baud_rate` against the rate table
pub fn is_supported_baud_rate(baud_rate: u32) -> bool {
    BAUD_RATES.contains(&baud_rate)
}

/// Current port parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortParams {
    pub baud_rate: u32,
    pub timeout: Duration,
}

/// Serial port handle used as a framing channel
pub struct SerialChannel {
    /// Serial port handle
    port: Box<dyn SerialPort>,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl SerialChannel {
    /// Open the configured port
    ///
    /// Pending input is discarded so the first read starts on fresh data.
    ///
    /// # Errors
    ///
    /// Returns error if the baud rate is not in [`BAUD_RATES`] or the port
    /// cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sirf_link::config::Config;
    /// use sirf_link::serial::SerialChannel;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// let serial = SerialChannel::open(&config.serial)?;
    /// println!("Connected to: {}", serial.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        if !is_supported_baud_rate(config.baud_rate) {
            return Err(SirfLinkError::UnsupportedBaudRate(config.baud_rate));
        }

        debug!("Opening serial port {} at {} baud", config.port, config.baud_rate);
        let port = tokio_serial::new(config.port.as_str(), config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()
            .map_err(|e| SirfLinkError::Serial(format!("Failed to open {}: {}", config.port, e)))?;

        port.clear(tokio_serial::ClearBuffer::Input)
            .map_err(|e| SirfLinkError::Serial(format!("Failed to flush input of {}: {}", config.port, e)))?;

        info!("Opened serial port {} at {} baud", config.port, config.baud_rate);
        Ok(Self::with_port(port, config.port.clone()))
    }

    /// Wrap an already-open port
    pub fn with_port(port: Box<dyn SerialPort>, device_path: String) -> Self {
        Self { port, device_path }
    }

    /// Read back baud rate and timeout from the open port
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be queried or reports a rate that is
    /// not in the rate table
    pub fn port_params(&self) -> Result<PortParams> {
        let baud_rate = self
            .port
            .baud_rate()
            .map_err(|e| SirfLinkError::Serial(format!("Failed to get baud rate: {}", e)))?;
        if !is_supported_baud_rate(baud_rate) {
            return Err(SirfLinkError::UnsupportedBaudRate(baud_rate));
        }

        Ok(PortParams {
            baud_rate,
            timeout: self.port.timeout(),
        })
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

/// Whether a read error only means "nothing arrived in time"
fn is_timeout(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

/// Read until `buf` is full or one read times out
///
/// A single port read returns whatever has arrived so far, which on a live
/// line is often one byte. Callers ask for exact counts (the two-byte OSP
/// length field), so the request is filled across reads. Each read waits
/// at most the port timeout, which makes the timeout an inter-byte gap.
///
/// # Returns
///
/// * `io::Result<usize>` - Bytes read; `0` if the line stayed quiet
///
/// # Errors
///
/// Returns the port error if it fails before any byte arrived. A failure
/// after a partial read returns the partial count; the next read reports it.
fn read_until_quiet<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(e.kind()) => break,
            Err(e) if filled > 0 => {
                debug!("Serial read failed after {} bytes: {}", filled, e);
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

impl Channel for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_until_quiet(&mut self.port, buf)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.port.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}
