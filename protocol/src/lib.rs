//! # UT32x Protocol Library
//!
//! This crate provides the core of the UNI-T UT32x thermometer driver:
//!
//! - **Report Reassembly**: rebuilds the serial stream tunnelled through
//!   CH9325 HID reports into a bounded frame buffer
//! - **Frame Detection**: finds `\r\n`-terminated packets, with an overrun
//!   guard that keeps the stream moving when a terminator is lost
//! - **Packet Decoding**: validates the 19-byte packet and extracts
//!   temperature, unit and channel
//! - **Sample Accounting**: counts every frame toward the acquisition limit
//!
//! ## Architecture
//!
//! ```text
//! transfer callback ───► Session ───► MeasurementSink
//!                           │
//!                  (no allocation, no locks)
//!                           │
//!                           └──────► SampleLimiter / AcquisitionControl
//! ```
//!
//! Everything runs synchronously inside the transfer-completion callback and
//! touches at most one frame worth of bytes per call.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod buffer;
pub mod device;
pub mod framer;
pub mod packet;
pub mod session;
pub mod temperature;
pub mod traits;

// Re-export main types for convenience
pub use buffer::{BufferError, FrameBuffer, RawChunk, ReportError, FRAME_CAPACITY};
pub use device::{Command, DataSource};
pub use framer::{Frame, FrameDetector, FrameTrigger};
pub use packet::{Channel, MeasurementRecord, PacketError, Unit};
pub use session::{Session, SessionCounters};
pub use temperature::{parse_temperature, Temperature, TemperatureError};
pub use traits::{AcquisitionControl, MeasurementSink, SampleLimiter};

/// Library version for driver compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of one complete measurement packet
pub const PACKET_SIZE: usize = 19;

/// Size of a CH9325 HID report
pub const REPORT_SIZE: usize = 8;

/// Largest payload a single report can carry
pub const MAX_CHUNK_LEN: usize = REPORT_SIZE - 1;

/// Packet terminator
pub const SEPARATOR: [u8; 2] = *b"\r\n";
