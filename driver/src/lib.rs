//! # UT32x Host Driver
//!
//! Host-side glue around [`ut32x_protocol`]. It handles:
//!
//! - The interrupt transfer completion callback and re-arming
//! - Start/stop commands for live and stored-memory acquisition
//! - Software sample limits
//! - JSON configuration
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  completions  ┌─────────────────────────────┐  records  ┌──────────┐
//! │ UsbTransport │──────────────►│ Device                      │──────────►│ DataFeed │
//! │ (libusb, …)  │◄──────────────│  Session + SoftwareLimits   │           └──────────┘
//! └──────────────┘ submit/stop   └─────────────────────────────┘
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod feed;
pub mod limits;
pub mod pump;
pub mod transport;

pub use config::AcquisitionConfig;
pub use device::{Device, DeviceStatus, TransferAction};
pub use error::{DriverError, Result, TransportError};
pub use feed::{ChannelFeed, DataFeed, FeedEvent};
pub use limits::SoftwareLimits;
pub use pump::{pump_completions, Completion};
pub use transport::UsbTransport;

pub use ut32x_protocol as protocol;
