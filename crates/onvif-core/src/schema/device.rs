//! Device-management service operations (`tds` namespace).

use serde::Serialize;

use super::{Category, OnvifRequest};

/// Queries the device's UTC date and time.  Always callable without
/// authentication; the session core issues it first to compute the clock
/// offset used by every later authenticated request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename = "tds:GetSystemDateAndTime")]
pub struct GetSystemDateAndTime {}

/// Queries the service capabilities and their endpoint addresses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "tds:GetCapabilities")]
pub struct GetCapabilities {
    /// Capability category filter; `"All"` requests every service.
    #[serde(rename = "tds:Category")]
    pub category: String,
}

impl Default for GetCapabilities {
    fn default() -> Self {
        Self {
            category: "All".to_string(),
        }
    }
}

/// Queries descriptive device metadata (manufacturer, model, firmware,
/// serial number, hardware id).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename = "tds:GetDeviceInformation")]
pub struct GetDeviceInformation {}

/// Requests a device reboot.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename = "tds:SystemReboot")]
pub struct SystemReboot {}

impl OnvifRequest for GetSystemDateAndTime {
    fn category(&self) -> Category {
        Category::Device
    }
}

impl OnvifRequest for GetCapabilities {
    fn category(&self) -> Category {
        Category::Device
    }
}

impl OnvifRequest for GetDeviceInformation {
    fn category(&self) -> Category {
        Category::Device
    }
}

impl OnvifRequest for SystemReboot {
    fn category(&self) -> Category {
        Category::Device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_capabilities_serializes_with_service_prefix() {
        let xml = GetCapabilities::default().to_xml().unwrap();
        assert_eq!(
            xml,
            "<tds:GetCapabilities><tds:Category>All</tds:Category></tds:GetCapabilities>"
        );
    }

    #[test]
    fn test_empty_operation_serializes_to_single_element() {
        let xml = GetSystemDateAndTime::default().to_xml().unwrap();
        assert_eq!(xml, "<tds:GetSystemDateAndTime/>");
    }

    #[test]
    fn test_device_operations_route_to_device_category() {
        assert_eq!(GetSystemDateAndTime::default().category(), Category::Device);
        assert_eq!(GetDeviceInformation::default().category(), Category::Device);
        assert_eq!(SystemReboot::default().category(), Category::Device);
    }
}
