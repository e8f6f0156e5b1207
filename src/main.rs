//! # SiRF Link
//!
//! Talk to a SiRF GNSS receiver over a serial port.
//!
//! The binary opens the configured port, sends the configured start-up
//! commands, then reads OSP or NMEA messages until Ctrl+C, optionally
//! capturing each one to a JSON Lines file.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;
use tokio::time::Duration;
use tracing::{debug, error, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use sirf_link::capture::CaptureWriter;
use sirf_link::channel::Channel;
use sirf_link::config::{CommandConfig, Config, LinkConfig, LoggingConfig};
use sirf_link::engine::{Engine, Message, Protocol};
use sirf_link::error::ReadError;
use sirf_link::serial::SerialChannel;

/// Config file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of messages between status log messages
const LOG_INTERVAL_MESSAGES: u64 = 1000;

/// How long Ctrl+C waits for the reader to notice the stop flag
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Outcome counters of the read loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ReadStats {
    messages: u64,
    sync_timeouts: u64,
    rejected: u64,
}

impl ReadStats {
    fn record(&mut self, result: &Result<Message<'_>, ReadError>) {
        match result {
            Ok(_) => self.messages += 1,
            Err(ReadError::SyncTimeout) => self.sync_timeouts += 1,
            Err(e) if e.is_recoverable() => self.rejected += 1,
            // Channel failures end the loop rather than reject a message
            Err(_) => {}
        }
    }

    fn log_totals(&self) {
        info!(
            "Total: {} messages, {} sync timeouts, {} rejected",
            self.messages, self.sync_timeouts, self.rejected
        );
    }
}

/// Main entry point for SiRF Link
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging to stderr and optionally a daily log file
///    - Open the serial port and report its parameters
///    - Send the configured `[[commands]]`
///
/// 2. **Read Loop** (dedicated thread, the port is blocking)
///    - Read messages of the configured protocol
///    - Skip recoverable statuses, stop on channel errors
///    - Log status every 1000 messages
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C raises the stop flag
///    - Log final counters
///
/// # Errors
///
/// Returns error if the configuration is invalid, the port cannot be
/// opened, a start-up command fails, or the channel fails while reading.
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging);
    info!("SiRF Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut serial = SerialChannel::open(&config.serial)?;
    let params = serial.port_params()?;
    info!(
        "Serial port {}: {} baud, timeout {} ms",
        serial.device_path(),
        params.baud_rate,
        params.timeout.as_millis()
    );

    let mut engine = Engine::with_capacity(config.link.buffer_capacity);
    for command in &config.commands {
        send_command(&mut engine, &mut serial, command)?;
    }

    let capture = if config.capture.enabled {
        Some(CaptureWriter::create(&config.capture.dir)?)
    } else {
        None
    };

    let running = Arc::new(AtomicBool::new(true));
    let (done_tx, mut done_rx) = oneshot::channel();
    {
        let running = Arc::clone(&running);
        let link = config.link.clone();
        thread::Builder::new()
            .name("sirf-reader".to_string())
            .spawn(move || {
                let mut stats = ReadStats::default();
                let result = read_loop(&mut engine, &mut serial, capture, &link, &running, &mut stats);
                stats.log_totals();
                let _ = done_tx.send(result);
            })
            .context("Failed to spawn reader thread")?;
    }

    info!("Press Ctrl+C to exit");

    let finished = tokio::select! {
        result = &mut done_rx => Some(result),
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            running.store(false, Ordering::Relaxed);
            tokio::time::timeout(SHUTDOWN_GRACE, &mut done_rx).await.ok()
        }
    };

    match finished {
        Some(Ok(Ok(()))) => Ok(()),
        Some(Ok(Err(e))) => {
            error!("Read loop failed: {:#}", e);
            Err(e)
        }
        Some(Err(_)) => anyhow::bail!("Reader thread exited without a result"),
        None => {
            warn!("Reader still blocked on the port, exiting anyway");
            Ok(())
        }
    }
}

/// Set up the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. The returned guard must be
/// held for as long as file logging should keep flushing.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if config.dir.is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.dir, "sirf-link.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Some(guard)
}

/// Send one configured start-up command
fn send_command<C: Channel + ?Sized>(
    engine: &mut Engine,
    channel: &mut C,
    command: &CommandConfig,
) -> Result<()> {
    match command.protocol {
        Protocol::Osp => {
            let message_id = u8::try_from(command.message_id)
                .with_context(|| format!("OSP message id {} does not fit a byte", command.message_id))?;
            engine.write_osp(channel, message_id, &command.arguments, command.base)?;
        }
        Protocol::Nmea => engine.write_nmea(channel, command.message_id, &command.arguments)?,
    }

    info!(
        "Sent {} command {} ({})",
        command.protocol, command.message_id, command.arguments
    );
    Ok(())
}

/// Read messages until `running` is cleared or the channel fails
///
/// `stats` keeps the counts gathered up to the failure.
fn read_loop<C: Channel + ?Sized>(
    engine: &mut Engine,
    channel: &mut C,
    mut capture: Option<CaptureWriter>,
    link: &LinkConfig,
    running: &AtomicBool,
    stats: &mut ReadStats,
) -> Result<()> {
    let protocol = link.protocol;
    let patience = link.effective_patience();
    let mut last_log_count = stats.messages;

    info!("Reading {} messages (patience {} bytes)", protocol, patience);

    while running.load(Ordering::Relaxed) {
        let result = engine.read(protocol, channel, patience);
        stats.record(&result);

        match result {
            Ok(message) => {
                log_message(&message);
                if let Some(writer) = capture.as_mut() {
                    writer.record(&message)?;
                    writer.flush()?;
                }
            }
            Err(ReadError::SyncTimeout) => {
                debug!("No {} start sequence within {} bytes", protocol, patience);
            }
            Err(e) if e.is_recoverable() => warn!("Rejected {} message: {}", protocol, e),
            Err(e) => return Err(e).context("Channel failed while reading"),
        }

        if stats.messages - last_log_count >= LOG_INTERVAL_MESSAGES {
            info!(
                "Read {} messages ({} sync timeouts, {} rejected)",
                stats.messages, stats.sync_timeouts, stats.rejected
            );
            last_log_count = stats.messages;
        }
    }

    Ok(())
}

fn log_message(message: &Message<'_>) {
    match message {
        Message::Osp(osp) => debug!(
            "OSP message {} (0x{:02X}), {} payload bytes",
            osp.message_id(),
            osp.message_id(),
            osp.len()
        ),
        Message::Nmea(sentence) => debug!(
            "NMEA ${}",
            sentence.as_str().unwrap_or("<non-ASCII sentence>")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Byte queue that reads back what is queued and records writes
    #[derive(Default)]
    struct QueueChannel {
        input: VecDeque<u8>,
        written: Vec<u8>,
        fail_reads: bool,
    }

    impl Channel for QueueChannel {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fail_reads && self.input.is_empty() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
            }
            let n = buf.len().min(self.input.len());
            for (slot, byte) in buf.iter_mut().zip(self.input.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }

        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn link(protocol: Protocol) -> LinkConfig {
        LinkConfig {
            protocol,
            buffer_capacity: 2052,
            patience: Some(32),
        }
    }

    fn command(protocol: Protocol, message_id: u16, arguments: &str) -> CommandConfig {
        CommandConfig {
            protocol,
            message_id,
            arguments: arguments.to_string(),
            base: 16,
        }
    }

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_log_interval_constant() {
        assert_eq!(LOG_INTERVAL_MESSAGES, 1000);
    }

    #[test]
    fn test_send_osp_command() {
        let mut engine = Engine::new();
        let mut channel = QueueChannel::default();

        send_command(&mut engine, &mut channel, &command(Protocol::Osp, 0x01, "")).unwrap();
        assert_eq!(
            channel.written,
            vec![0xA0, 0xA2, 0x00, 0x01, 0x01, 0x00, 0x01, 0xB0, 0xB3]
        );
    }

    #[test]
    fn test_send_nmea_command() {
        let mut engine = Engine::new();
        let mut channel = QueueChannel::default();

        send_command(&mut engine, &mut channel, &command(Protocol::Nmea, 5, "A,B")).unwrap();
        assert_eq!(channel.written, b"$PSRF005,A,B*21\r\n".to_vec());
    }

    #[test]
    fn test_send_osp_command_with_wide_id() {
        let mut engine = Engine::new();
        let mut channel = QueueChannel::default();

        let result = send_command(&mut engine, &mut channel, &command(Protocol::Osp, 300, ""));
        assert!(result.is_err());
        assert!(channel.written.is_empty());
    }

    #[test]
    fn test_read_loop_counts_until_channel_fails() {
        let mut engine = Engine::new();
        let mut channel = QueueChannel {
            fail_reads: true,
            ..Default::default()
        };
        // Good sentence, bad checksum, good sentence
        channel.input.extend(b"\n$GPS*44\r\n$GPS*2B\r\n$GPS*44\r".iter().copied());
        let running = AtomicBool::new(true);

        let mut stats = ReadStats::default();

        let result = read_loop(
            &mut engine,
            &mut channel,
            None,
            &link(Protocol::Nmea),
            &running,
            &mut stats,
        );

        assert!(result.is_err());
        assert_eq!(stats.messages, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.sync_timeouts, 0);
    }

    #[test]
    fn test_read_loop_stops_on_flag() {
        let mut engine = Engine::new();
        let mut channel = QueueChannel::default();
        let running = AtomicBool::new(false);

        let mut stats = ReadStats::default();

        read_loop(&mut engine, &mut channel, None, &link(Protocol::Osp), &running, &mut stats).unwrap();
        assert_eq!(stats, ReadStats::default());
    }

    #[test]
    fn test_stats_record() {
        let mut stats = ReadStats::default();
        stats.record(&Err(ReadError::SyncTimeout));
        stats.record(&Err(ReadError::MalformedChecksum));
        stats.record(&Err(ReadError::StreamExhausted));
        stats.record(&Err(ReadError::Channel(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "unplugged",
        ))));

        assert_eq!(stats.messages, 0);
        assert_eq!(stats.sync_timeouts, 1);
        assert_eq!(stats.rejected, 2);
    }
}
