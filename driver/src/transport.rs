//! # USB Transport Abstraction
//!
//! The driver never talks to libusb (or any other stack) directly. A
//! transport owns the single interrupt transfer used to read reports from
//! [`EP_IN`](ut32x_protocol::device::EP_IN) and the bulk OUT pipe used for
//! commands.
//!
//! The transport must guarantee that at most one transfer completion is in
//! flight: the next transfer is only submitted from within
//! [`Device::on_transfer_complete`](crate::Device::on_transfer_complete).

use std::time::Duration;

use ut32x_protocol::Command;

use crate::error::TransportError;

/// USB operations required by the driver
pub trait UsbTransport {
    /// Arm (or re-arm) the interrupt IN transfer
    fn submit_transfer(&mut self) -> Result<(), TransportError>;

    /// Free the interrupt transfer; it will not be submitted again
    fn release_transfer(&mut self);

    /// Write raw bytes to the OUT endpoint, returning the number written
    fn write_out(&mut self, data: &[u8], timeout: Duration) -> Result<usize, TransportError>;

    /// Send a two-byte device command, failing on a short write
    fn send_command(&mut self, command: Command, timeout: Duration) -> Result<(), TransportError> {
        let bytes = command.to_bytes();
        let written = self.write_out(&bytes, timeout)?;
        if written != bytes.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }
        Ok(())
    }
}
