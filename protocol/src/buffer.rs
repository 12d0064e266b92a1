//! # Report Payload Accumulation
//!
//! The CH9325 bridge chip inside the UT32x tunnels the thermometer's serial
//! output through 8-byte HID interrupt reports. Only the low nibble of the
//! first byte carries meaning: it is the number of serial bytes that follow.
//!
//! ```text
//! ┌──────────┬────────────────────────────────────────────┐
//! │ byte 0   │ bytes 1..=7                                │
//! │ 0xF0 | N │ N payload bytes, remainder is padding      │
//! └──────────┴────────────────────────────────────────────┘
//! ```
//!
//! [`RawChunk`] is the payload of a single report and [`FrameBuffer`] is the
//! bounded accumulator those payloads are appended to until the frame
//! detector decides a packet is complete.

use heapless::Vec;

use crate::{MAX_CHUNK_LEN, PACKET_SIZE, REPORT_SIZE};

/// Frame buffer capacity: one full packet plus the largest single payload.
///
/// The detector fires as soon as the buffer holds more than [`PACKET_SIZE`]
/// bytes, so an append can never start from more than `PACKET_SIZE` bytes.
pub const FRAME_CAPACITY: usize = PACKET_SIZE + MAX_CHUNK_LEN;

/// Mask extracting the payload length from the first report byte
const LENGTH_MASK: u8 = 0x0F;

/// Reasons a HID report yields no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Transfer completed with something other than 8 bytes
    WrongSize(usize),
    /// Length nibble was zero
    Empty,
    /// Length nibble claims more bytes than the report can hold
    PayloadTooLong(u8),
}

/// Errors specific to buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// Appending would exceed [`FRAME_CAPACITY`]
    Overflow,
}

/// Serial payload carried by one HID report (1 to 7 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk {
    data: [u8; MAX_CHUNK_LEN],
    len: u8,
}

impl RawChunk {
    /// Wrap a payload slice, rejecting empty or oversized payloads
    pub fn new(payload: &[u8]) -> Option<Self> {
        if payload.is_empty() || payload.len() > MAX_CHUNK_LEN {
            return None;
        }
        let mut data = [0u8; MAX_CHUNK_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            data,
            len: payload.len() as u8,
        })
    }

    /// Extract the payload from a completed 8-byte HID report
    ///
    /// # Example
    ///
    /// ```rust
    /// use ut32x_protocol::buffer::RawChunk;
    ///
    /// let report = [0xF3, b'a', b'b', b'c', 0, 0, 0, 0];
    /// let chunk = RawChunk::from_report(&report).unwrap();
    /// assert_eq!(chunk.as_slice(), b"abc");
    /// ```
    pub fn from_report(report: &[u8]) -> Result<Self, ReportError> {
        if report.len() != REPORT_SIZE {
            return Err(ReportError::WrongSize(report.len()));
        }

        let len = report[0] & LENGTH_MASK;
        if len == 0 {
            return Err(ReportError::Empty);
        }
        if len as usize > MAX_CHUNK_LEN {
            return Err(ReportError::PayloadTooLong(len));
        }

        Self::new(&report[1..=len as usize]).ok_or(ReportError::PayloadTooLong(len))
    }

    /// The payload bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// Payload length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false for a constructed chunk
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bounded accumulator for the reassembled serial stream
///
/// Pure data movement: the buffer knows nothing about terminators or packet
/// layout. It is owned by exactly one device session and is never shared.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    data: Vec<u8, FRAME_CAPACITY>,
}

impl FrameBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Get the total capacity of the buffer
    #[inline]
    pub const fn capacity(&self) -> usize {
        FRAME_CAPACITY
    }

    /// Number of buffered bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a chunk's payload to the end of the buffer
    ///
    /// Leaves the buffer untouched if the payload does not fit.
    pub fn append(&mut self, chunk: &RawChunk) -> Result<(), BufferError> {
        self.data
            .extend_from_slice(chunk.as_slice())
            .map_err(|_| BufferError::Overflow)
    }

    /// Check whether the buffered bytes end with `suffix`
    #[inline]
    pub fn ends_with(&self, suffix: &[u8]) -> bool {
        self.data.ends_with(suffix)
    }

    /// View of the buffered bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Reset the buffer to empty state
    pub fn reset(&mut self) {
        self.data.clear();
    }
}
