//! Async report pump.
//!
//! USB stacks usually complete transfers on their own event thread. The pump
//! receives those completions over a channel and runs them through the
//! device one at a time, so the decoder still sees a single callback in
//! flight.

use log::debug;
use tokio::sync::mpsc;
use ut32x_protocol::SessionCounters;

use crate::device::{Device, DeviceStatus, TransferAction};
use crate::feed::DataFeed;
use crate::transport::UsbTransport;

/// Bytes of one completed interrupt transfer
pub type Completion = Vec<u8>;

/// Drive `device` from completed transfers until the transfer is released
/// or the sender side closes
pub async fn pump_completions<T, F>(
    device: &mut Device<T, F>,
    mut completions: mpsc::Receiver<Completion>,
) -> SessionCounters
where
    T: UsbTransport,
    F: DataFeed,
{
    while let Some(buffer) = completions.recv().await {
        let action = device.on_transfer_complete(&buffer);
        device.handle_events();
        if action == TransferAction::Released {
            break;
        }
    }

    if device.status() != DeviceStatus::Idle {
        debug!("Completion channel closed, aborting acquisition");
        device.abort();
    }

    *device.counters()
}
