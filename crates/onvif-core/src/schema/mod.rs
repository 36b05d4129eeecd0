//! Typed ONVIF operations, grouped by capability category.
//!
//! The exhaustive ONVIF schema runs to hundreds of request/response shapes;
//! this module carries the operations the session core itself needs plus a
//! representative set per service.  What matters structurally is that every
//! operation declares its [`Category`] as static data: the client routes a
//! call to the right service endpoint from that declaration alone, with no
//! runtime type inspection.
//!
//! Serialization: operation structs derive `Serialize` and are rendered to
//! their payload element with quick-xml's serde support.  Struct and field
//! renames carry the service prefix (`tds:`, `trt:`, ...), which the
//! envelope declares at the root.

pub mod device;
pub mod event;
pub mod imaging;
pub mod media;
pub mod ptz;

use serde::Serialize;

use crate::soap::SoapError;

/// The fixed, closed set of ONVIF capability categories.
///
/// `as_str()` values match the element names used in capability responses,
/// which is what keys the endpoint directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Device,
    Events,
    Imaging,
    Media,
    Ptz,
}

impl Category {
    /// The capability-response element name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Device => "Device",
            Category::Events => "Events",
            Category::Imaging => "Imaging",
            Category::Media => "Media",
            Category::Ptz => "PTZ",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing ONVIF operation.
///
/// Implementors declare the capability category that routes them and are
/// serialized into the envelope body by the provided [`to_xml`] method.
///
/// [`to_xml`]: OnvifRequest::to_xml
pub trait OnvifRequest: Serialize {
    /// The capability category this operation belongs to.
    fn category(&self) -> Category;

    /// Renders the operation to its XML payload element.
    ///
    /// # Errors
    ///
    /// Returns [`SoapError::Serialize`] if the struct cannot be serialized.
    fn to_xml(&self) -> Result<String, SoapError> {
        Ok(quick_xml::se::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_match_capability_elements() {
        assert_eq!(Category::Device.as_str(), "Device");
        assert_eq!(Category::Ptz.as_str(), "PTZ");
        assert_eq!(Category::Events.as_str(), "Events");
    }
}
