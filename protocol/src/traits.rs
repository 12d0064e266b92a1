//! # Session Collaborator Traits
//!
//! The decoding session does not own the data feed, the sample limiter or
//! the acquisition lifecycle. It talks to them through three small traits:
//!
//! - **MeasurementSink**: receives every valid measurement
//! - **SampleLimiter**: counts processed frames and reports when to stop
//! - **AcquisitionControl**: asked to stop once the limit is reached
//!
//! A host usually implements all three on its device context and passes it
//! to [`Session::on_bytes`](crate::session::Session::on_bytes).

use crate::packet::MeasurementRecord;

/// Destination for decoded measurements
pub trait MeasurementSink {
    /// Push one measurement downstream. Called synchronously from the
    /// transfer callback, so implementations must not block.
    fn emit(&mut self, record: MeasurementRecord);
}

/// Sample-count limit bookkeeping
pub trait SampleLimiter {
    /// Add `count` processed samples to the running total
    fn record_samples_read(&mut self, count: u64);

    /// Whether the configured limit has been reached
    fn limit_reached(&self) -> bool;
}

/// Acquisition lifecycle hook
pub trait AcquisitionControl {
    /// Ask the driver to wind down acquisition. May be called more than once.
    fn request_stop(&mut self);
}

impl<S: MeasurementSink + ?Sized> MeasurementSink for &mut S {
    fn emit(&mut self, record: MeasurementRecord) {
        (**self).emit(record)
    }
}

impl<L: SampleLimiter + ?Sized> SampleLimiter for &mut L {
    fn record_samples_read(&mut self, count: u64) {
        (**self).record_samples_read(count)
    }

    fn limit_reached(&self) -> bool {
        (**self).limit_reached()
    }
}

impl<C: AcquisitionControl + ?Sized> AcquisitionControl for &mut C {
    fn request_stop(&mut self) {
        (**self).request_stop()
    }
}

#[cfg(feature = "std")]
impl MeasurementSink for std::vec::Vec<MeasurementRecord> {
    fn emit(&mut self, record: MeasurementRecord) {
        self.push(record);
    }
}

impl<const N: usize> MeasurementSink for heapless::Vec<MeasurementRecord, N> {
    /// Drops the record when the vector is full
    fn emit(&mut self, record: MeasurementRecord) {
        let _ = self.push(record);
    }
}
