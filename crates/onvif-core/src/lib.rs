//! # onvif-core
//!
//! Shared protocol foundation for the ONVIF device-session client: SOAP
//! envelope construction, the fixed protocol namespace registry, WS-Security
//! UsernameToken generation, streaming XML extraction helpers, and the typed
//! operation schema grouped by capability category.
//!
//! This crate performs no network I/O.  It is consumed by `onvif-client`,
//! which owns the HTTP transport, the device session, and WS-Discovery.
//!
//! # Architecture overview
//!
//! ONVIF devices (IP cameras and similar) expose their services as SOAP 1.2
//! endpoints.  Every remote call is one XML payload element wrapped in an
//! envelope that carries the ONVIF namespace declarations and, for
//! authenticated calls, a time-sensitive WS-Security header.  This crate
//! defines:
//!
//! - **`soap`** – How envelopes are put together: the namespace registry,
//!   the envelope builder, the UsernameToken digest, and a small streaming
//!   reader for pulling values out of response documents by element path.
//!
//! - **`schema`** – The typed request side.  Each operation struct declares
//!   the capability category it belongs to ([`Category`]), which the client
//!   uses to route the call to the right service endpoint.

pub mod schema;
pub mod soap;

// Re-export the most-used items at the crate root so callers can write
// `onvif_core::build_envelope` instead of the full module path.
pub use schema::{Category, OnvifRequest};
pub use soap::envelope::build_envelope;
pub use soap::namespaces::{ENVELOPE_NS, NAMESPACES};
pub use soap::parse::{first_text_at_path, texts_at_path, PathHit};
pub use soap::security::username_token;
pub use soap::SoapError;
