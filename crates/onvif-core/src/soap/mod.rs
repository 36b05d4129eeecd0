//! SOAP 1.2 plumbing: namespace registry, envelope builder, WS-Security
//! UsernameToken generation, and streaming response extraction.

pub mod envelope;
pub mod namespaces;
pub mod parse;
pub mod security;

use thiserror::Error;

/// Errors raised while building envelopes or reading response documents.
#[derive(Debug, Error)]
pub enum SoapError {
    /// The operation payload is not well-formed XML and cannot be wrapped.
    #[error("payload is not well-formed XML: {0}")]
    MalformedPayload(String),

    /// An operation struct could not be serialized to XML.
    #[error("failed to serialize operation to XML: {0}")]
    Serialize(#[from] quick_xml::se::SeError),

    /// A response document could not be read.
    #[error("failed to read XML document: {0}")]
    Read(String),
}
