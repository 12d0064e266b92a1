//! # Acquisition Lifecycle
//!
//! [`Device`] ties the decoding [`Session`] to a USB transport and a data
//! feed. The transport calls [`Device::on_transfer_complete`] for every
//! finished interrupt transfer; the event loop calls
//! [`Device::handle_events`] to finish a pending stop.
//!
//! ```text
//!            start()                 limit reached / request_stop()
//!   Idle ──────────────► Acquiring ─────────────────────────────► Stopping
//!    ▲                                                               │
//!    └───────────────────────── handle_events() ─────────────────────┘
//! ```

use log::{debug, info, warn};
use ut32x_protocol::{
    AcquisitionControl, Command, MeasurementRecord, MeasurementSink, SampleLimiter, Session,
    SessionCounters, REPORT_SIZE,
};

use crate::config::AcquisitionConfig;
use crate::error::{DriverError, Result};
use crate::feed::DataFeed;
use crate::limits::SoftwareLimits;
use crate::transport::UsbTransport;

/// Acquisition state of the device
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Open but not acquiring
    #[default]
    Idle,
    Acquiring,
    /// Stop requested; the transfer is released on its next completion
    Stopping,
}

/// What happened to the interrupt transfer after a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAction {
    Resubmitted,
    Released,
}

/// One opened UT32x thermometer
pub struct Device<T, F> {
    config: AcquisitionConfig,
    transport: T,
    feed: F,
    session: Session,
    limits: SoftwareLimits,
    status: DeviceStatus,
    /// The interrupt transfer is submitted and not yet released
    transfer_armed: bool,
}

/// Borrowed view handed to the session for the duration of one callback
struct CallbackContext<'a, F> {
    feed: &'a mut F,
    limits: &'a mut SoftwareLimits,
    status: &'a mut DeviceStatus,
}

impl<F: MeasurementSink> MeasurementSink for CallbackContext<'_, F> {
    fn emit(&mut self, record: MeasurementRecord) {
        self.feed.emit(record);
    }
}

impl<F> SampleLimiter for CallbackContext<'_, F> {
    fn record_samples_read(&mut self, count: u64) {
        self.limits.record_samples_read(count);
    }

    fn limit_reached(&self) -> bool {
        self.limits.limit_reached()
    }
}

impl<F> AcquisitionControl for CallbackContext<'_, F> {
    fn request_stop(&mut self) {
        if *self.status == DeviceStatus::Acquiring {
            debug!("Sample limit reached, stopping acquisition");
            *self.status = DeviceStatus::Stopping;
        }
    }
}

impl<T: UsbTransport, F: DataFeed> Device<T, F> {
    pub fn new(config: AcquisitionConfig, transport: T, feed: F) -> Self {
        let limits = SoftwareLimits::new(config.limit_samples);
        Self {
            config,
            transport,
            feed,
            session: Session::new(),
            limits,
            status: DeviceStatus::Idle,
            transfer_armed: false,
        }
    }

    /// Send the start command for the configured data source and arm the
    /// interrupt transfer
    pub fn start(&mut self) -> Result<()> {
        if self.status != DeviceStatus::Idle {
            return Err(DriverError::Busy);
        }

        info!(
            "Starting acquisition from {} source",
            self.config.data_source.name()
        );
        self.session = Session::new();
        self.limits.start();

        let command = self.config.data_source.start_command();
        self.transport
            .send_command(command, self.config.command_timeout())?;
        self.transport.submit_transfer()?;
        self.transfer_armed = true;

        self.status = DeviceStatus::Acquiring;
        Ok(())
    }

    /// Request a stop; completed on the next transfer and [`handle_events`](Self::handle_events)
    pub fn request_stop(&mut self) {
        if self.status == DeviceStatus::Acquiring {
            self.status = DeviceStatus::Stopping;
        }
    }

    /// Stop without waiting for another transfer completion
    pub fn abort(&mut self) {
        if self.status == DeviceStatus::Idle {
            return;
        }
        self.release_transfer();
        self.status = DeviceStatus::Stopping;
        self.handle_events();
    }

    /// Transfer-completion callback
    ///
    /// Anything other than a full 8-byte report is ignored. The report is
    /// fully processed before the stop flag is consulted.
    pub fn on_transfer_complete(&mut self, buffer: &[u8]) -> TransferAction {
        if buffer.len() == REPORT_SIZE {
            let mut ctx = CallbackContext {
                feed: &mut self.feed,
                limits: &mut self.limits,
                status: &mut self.status,
            };
            self.session.on_report(buffer, &mut ctx);
        } else {
            debug!("Ignoring {}-byte transfer", buffer.len());
        }

        if self.status == DeviceStatus::Stopping {
            self.release_transfer();
            return TransferAction::Released;
        }

        match self.transport.submit_transfer() {
            Ok(()) => {
                self.transfer_armed = true;
                TransferAction::Resubmitted
            }
            Err(e) => {
                debug!("Failed to resubmit transfer: {}", e);
                self.status = DeviceStatus::Stopping;
                self.release_transfer();
                TransferAction::Released
            }
        }
    }

    /// Release the interrupt transfer at most once per submission
    fn release_transfer(&mut self) {
        if self.transfer_armed {
            self.transport.release_transfer();
            self.transfer_armed = false;
        }
    }

    /// Finish a pending stop: end the feed and tell the device to go quiet
    ///
    /// Returns `true` if a stop was completed.
    pub fn handle_events(&mut self) -> bool {
        if self.status != DeviceStatus::Stopping {
            return false;
        }

        self.feed.end();

        if let Err(e) = self
            .transport
            .send_command(Command::Stop, self.config.command_timeout())
        {
            warn!("Failed to send stop command: {}", e);
        }

        info!(
            "Acquisition stopped after {} frames",
            self.session.counters().frames
        );
        self.status = DeviceStatus::Idle;
        true
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    pub fn counters(&self) -> &SessionCounters {
        self.session.counters()
    }

    pub fn limits(&self) -> &SoftwareLimits {
        &self.limits
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Whether the interrupt transfer is currently submitted
    pub fn transfer_armed(&self) -> bool {
        self.transfer_armed
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consume the device, returning the transport and feed
    pub fn into_parts(self) -> (T, F) {
        (self.transport, self.feed)
    }
}
