//! # SiRF Link Library
//!
//! Read and write messages from SiRF GNSS receivers over a serial port.
//!
//! This library provides the framing engine for the two protocols a SiRF
//! receiver speaks on the same byte stream: binary OSP frames
//! (`A0 A2 … B0 B3`) and NMEA text sentences (`$…*SS<CR><LF>`). The engine
//! resynchronizes on noisy input within a bounded patience budget,
//! validates lengths and checksums, and builds outbound command frames.
//!
//! ```
//! use sirf_link::engine::Engine;
//! # use sirf_link::channel::Channel;
//! # struct Loopback(std::collections::VecDeque<u8>);
//! # impl Channel for Loopback {
//! #     fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
//! #         let n = buf.len().min(self.0.len());
//! #         for slot in &mut buf[..n] { *slot = self.0.pop_front().unwrap(); }
//! #         Ok(n)
//! #     }
//! #     fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
//! #         self.0.extend(data);
//! #         Ok(data.len())
//! #     }
//! #     fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
//! # }
//! # let mut channel = Loopback(Default::default());
//! let mut engine = Engine::new();
//! engine.write_osp(&mut channel, 0x84, "00", 16)?;
//!
//! let message = engine.read_osp(&mut channel, 100)?;
//! assert_eq!(message.message_id(), 0x84);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod capture;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame_buffer;
pub mod nmea;
pub mod osp;
pub mod serial;
pub mod sync;
