//! # Per-Device Decoding Session
//!
//! [`Session`] is the state machine driven by the transfer-completion
//! callback. It owns the frame buffer and the session counters; everything
//! else is passed in by the caller.
//!
//! ```text
//! HID report ──► RawChunk ──► FrameDetector ──► packet::decode ──► sink
//!                                  │
//!                                  └──► accounting ──► limiter ──► stop?
//! ```
//!
//! Accounting runs once for every frame the detector fires on, whether or
//! not it decoded. Unused memory slots come through as `;;;;` packets, and
//! they must still count toward a sample limit when reading stored data.

use log::debug;

use crate::buffer::RawChunk;
use crate::framer::{FrameDetector, FrameTrigger};
use crate::packet::{self, MeasurementRecord};
use crate::traits::{AcquisitionControl, MeasurementSink, SampleLimiter};

/// Running totals for one session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionCounters {
    /// Frames handed to the decoder; this is what the limiter sees
    pub frames: u64,
    /// Frames that produced a measurement
    pub measurements: u64,
    /// Frames forced out by the overrun guard
    pub overruns: u64,
    /// Reports that carried no usable payload
    pub ignored_reports: u64,
}

/// Reassembly and decoding state for one device
#[derive(Debug, Clone, Default)]
pub struct Session {
    detector: FrameDetector,
    counters: SessionCounters,
}

impl Session {
    pub const fn new() -> Self {
        Self {
            detector: FrameDetector::new(),
            counters: SessionCounters {
                frames: 0,
                measurements: 0,
                overruns: 0,
                ignored_reports: 0,
            },
        }
    }

    /// Feed a completed HID report
    ///
    /// Reports that are not 8 bytes long or carry no payload are ignored.
    pub fn on_report<H>(&mut self, report: &[u8], host: &mut H) -> Option<MeasurementRecord>
    where
        H: MeasurementSink + SampleLimiter + AcquisitionControl,
    {
        match RawChunk::from_report(report) {
            Ok(chunk) => self.on_bytes(&chunk, host),
            Err(e) => {
                debug!("Ignoring report: {:?}", e);
                self.counters.ignored_reports += 1;
                None
            }
        }
    }

    /// Feed one report payload
    ///
    /// Returns the measurement decoded from a completed frame, if any. The
    /// same record has already been pushed to `host` by the time this returns.
    pub fn on_bytes<H>(&mut self, chunk: &RawChunk, host: &mut H) -> Option<MeasurementRecord>
    where
        H: MeasurementSink + SampleLimiter + AcquisitionControl,
    {
        let counters = &mut self.counters;
        self.detector
            .push(chunk, |frame| {
                if frame.trigger() == FrameTrigger::Overrun {
                    counters.overruns += 1;
                }

                let record = packet::decode(frame.bytes());
                if let Some(record) = record {
                    counters.measurements += 1;
                    host.emit(record);
                }

                account_frame(counters, host);
                record
            })
            .flatten()
    }

    #[inline]
    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Bytes buffered towards the next frame
    #[inline]
    pub fn pending_bytes(&self) -> usize {
        self.detector.pending()
    }

    /// Drop any partial frame, keeping the counters
    pub fn discard_partial(&mut self) {
        self.detector.reset();
    }
}

/// Count one frame and stop acquisition if the limit was hit
fn account_frame<H>(counters: &mut SessionCounters, host: &mut H)
where
    H: SampleLimiter + AcquisitionControl,
{
    counters.frames += 1;
    host.record_samples_read(1);
    if host.limit_reached() {
        host.request_stop();
    }
}
