//! Event service operations (`tev` namespace).

use serde::Serialize;

use super::{Category, OnvifRequest};

/// Queries the event properties (topic set, dialects) of the device.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename = "tev:GetEventProperties")]
pub struct GetEventProperties {}

impl OnvifRequest for GetEventProperties {
    fn category(&self) -> Category {
        Category::Events
    }
}
