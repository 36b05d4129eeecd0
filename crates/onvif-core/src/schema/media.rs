//! Media service operations (`trt` namespace).

use serde::Serialize;

use super::{Category, OnvifRequest};

/// Lists the device's media profiles.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename = "trt:GetProfiles")]
pub struct GetProfiles {}

/// Queries the stream URI for one media profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "trt:GetStreamUri")]
pub struct GetStreamUri {
    #[serde(rename = "trt:ProfileToken")]
    pub profile_token: String,
}

impl OnvifRequest for GetProfiles {
    fn category(&self) -> Category {
        Category::Media
    }
}

impl OnvifRequest for GetStreamUri {
    fn category(&self) -> Category {
        Category::Media
    }
}
