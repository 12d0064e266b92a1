//! # Frame Detection
//!
//! The thermometer's serial framing is self-terminating: every packet ends in
//! `\r\n`. The detector checks the accumulated stream after every append and
//! fires in one of two situations:
//!
//! - **Terminated**: the buffer ends with the separator.
//! - **Overrun**: the buffer holds more than [`PACKET_SIZE`] bytes without a
//!   separator. The garbage is still handed to the decoder (which will almost
//!   always reject it) so the stream keeps moving if a terminator is lost.
//!
//! Either way the buffer is reset once the decode callback returns.

use log::debug;

use crate::buffer::{FrameBuffer, RawChunk};
use crate::{PACKET_SIZE, SEPARATOR};

/// Why a frame was handed to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameTrigger {
    /// The buffer ended with `\r\n`
    Terminated,
    /// The buffer grew past the packet size without a terminator
    Overrun,
}

/// Read-only view of the frame buffer at the moment the detector fired
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    bytes: &'a [u8],
    trigger: FrameTrigger,
}

impl<'a> Frame<'a> {
    /// The candidate packet bytes
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Whether the frame was terminated or forced out by an overrun
    #[inline]
    pub fn trigger(&self) -> FrameTrigger {
        self.trigger
    }
}

/// Accumulator plus boundary detection for one device session
#[derive(Debug, Clone, Default)]
pub struct FrameDetector {
    buffer: FrameBuffer,
}

impl FrameDetector {
    pub const fn new() -> Self {
        Self {
            buffer: FrameBuffer::new(),
        }
    }

    /// Append a chunk and, if a frame boundary was reached, run `decode` on it
    ///
    /// Returns `None` while waiting for more bytes. When the detector fires the
    /// buffer is reset after `decode` returns, whatever its outcome.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ut32x_protocol::buffer::RawChunk;
    /// use ut32x_protocol::framer::FrameDetector;
    ///
    /// let mut detector = FrameDetector::new();
    /// let chunk = RawChunk::new(b"ab\r\n").unwrap();
    /// let len = detector.push(&chunk, |frame| frame.bytes().len());
    /// assert_eq!(len, Some(4));
    /// assert_eq!(detector.pending(), 0);
    /// ```
    pub fn push<R>(&mut self, chunk: &RawChunk, decode: impl FnOnce(Frame<'_>) -> R) -> Option<R> {
        let trigger = match self.buffer.append(chunk) {
            Ok(()) => self.check()?,
            Err(_) => {
                // Only reachable if a previous overrun was not handled
                debug!("Frame buffer full, dropping {} byte chunk", chunk.len());
                FrameTrigger::Overrun
            }
        };

        if trigger == FrameTrigger::Overrun {
            debug!("Buffer overrun!");
        }

        let result = decode(Frame {
            bytes: self.buffer.as_slice(),
            trigger,
        });
        self.buffer.reset();
        Some(result)
    }

    fn check(&self) -> Option<FrameTrigger> {
        if self.buffer.len() >= SEPARATOR.len() && self.buffer.ends_with(&SEPARATOR) {
            Some(FrameTrigger::Terminated)
        } else if self.buffer.len() > PACKET_SIZE {
            Some(FrameTrigger::Overrun)
        } else {
            None
        }
    }

    /// Number of bytes waiting for a frame boundary
    #[inline]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discard any partially accumulated frame
    pub fn reset(&mut self) {
        self.buffer.reset();
    }
}
