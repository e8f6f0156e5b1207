//! # Capture Module
//!
//! Records every accepted message as one JSON object per line (JSONL).
//!
//! OSP records carry the message id and the payload as hex; NMEA records
//! carry the sentence text between `$` and `*`.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::engine::{Message, Protocol};
use crate::error::Result;

/// One line of the capture file
#[derive(Debug, Serialize)]
pub struct CaptureRecord<'a> {
    /// RFC 3339 UTC receive time
    pub timestamp: String,
    pub protocol: Protocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<u8>,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence: Option<&'a str>,
}

impl<'a> CaptureRecord<'a> {
    /// Build a record for `message` stamped with the current time
    pub fn from_message(message: &Message<'a>) -> Self {
        let timestamp = chrono::Utc::now().to_rfc3339();

        match message {
            Message::Osp(osp) => Self {
                timestamp,
                protocol: Protocol::Osp,
                message_id: Some(osp.message_id()),
                length: osp.len(),
                payload: Some(to_hex(osp.payload())),
                sentence: None,
            },
            Message::Nmea(nmea) => Self {
                timestamp,
                protocol: Protocol::Nmea,
                message_id: None,
                length: nmea.len(),
                // Non-UTF-8 bytes cannot pass as text; keep them as hex
                payload: nmea.as_str().is_none().then(|| to_hex(nmea.as_bytes())),
                sentence: nmea.as_str(),
            },
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Appends capture records to a JSONL file
#[derive(Debug)]
pub struct CaptureWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    records: u64,
}

impl CaptureWriter {
    /// Create `capture_<timestamp>.jsonl` inside `dir`, creating `dir` if needed
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;

        let file_name = format!("capture_{}.jsonl", chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ"));
        let path = dir.as_ref().join(file_name);
        let file = File::create(&path)?;
        info!("Capturing messages to {}", path.display());

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            records: 0,
        })
    }

    pub fn record(&mut self, message: &Message<'_>) -> Result<()> {
        let record = CaptureRecord::from_message(message);
        serde_json::to_writer(&mut self.writer, &record).map_err(std::io::Error::from)?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> u64 {
        self.records
    }
}
