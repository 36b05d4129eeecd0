//! # onvif-client
//!
//! Client-side ONVIF device session core: discover camera-like devices on
//! the local network, authenticate against them, and issue typed operations
//! over SOAP/HTTP.
//!
//! The central type is [`DeviceSession`]: one remote device endpoint with
//! its credentials, clock offset, and per-service endpoint directory.
//! Sessions are created directly from an address or in bulk via
//! [`discovery::discover`].  Construction performs two bootstrap queries
//! (system time, capabilities) and fails outright if either cannot be
//! completed; no partially-usable session is ever returned.
//!
//! ```no_run
//! use onvif_client::DeviceSession;
//! use onvif_core::schema::device::GetDeviceInformation;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = DeviceSession::connect("192.168.1.10:80").await?;
//! session.authenticate("admin", "secret");
//! let response = session.call_method(&GetDeviceInformation::default()).await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency model
//!
//! There is no internal concurrency: every call is an `async fn` that
//! completes on the caller's task, with no spawned workers, pooling, or
//! background refresh.  Distinct sessions share no state and may be used in
//! parallel freely; mutating one session (authenticate, clock resync) takes
//! `&mut self`, so racing it against dispatch is a compile error.

pub mod config;
pub mod discovery;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use discovery::{discover, DiscoveryConfig, DiscoveryError};
pub use session::{Credentials, DeviceInfo, DeviceSession, SessionError};
pub use transport::{HttpTransport, SoapResponse, Transport, TransportError};
