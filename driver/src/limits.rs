//! Software sample limits.

use ut32x_protocol::SampleLimiter;

/// Counts processed frames against an optional limit
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SoftwareLimits {
    limit_samples: Option<u64>,
    samples_read: u64,
}

impl SoftwareLimits {
    /// A limit of 0 is treated as unlimited
    pub fn new(limit_samples: Option<u64>) -> Self {
        Self {
            limit_samples: limit_samples.filter(|&n| n > 0),
            samples_read: 0,
        }
    }

    /// Reset the running count at the start of an acquisition
    pub fn start(&mut self) {
        self.samples_read = 0;
    }

    pub fn samples_read(&self) -> u64 {
        self.samples_read
    }

    pub fn limit_samples(&self) -> Option<u64> {
        self.limit_samples
    }
}

impl SampleLimiter for SoftwareLimits {
    fn record_samples_read(&mut self, count: u64) {
        self.samples_read = self.samples_read.saturating_add(count);
    }

    fn limit_reached(&self) -> bool {
        self.limit_samples
            .is_some_and(|limit| self.samples_read >= limit)
    }
}
