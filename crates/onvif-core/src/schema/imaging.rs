//! Imaging service operations (`timg` namespace).

use serde::Serialize;

use super::{Category, OnvifRequest};

/// Queries the imaging settings of one video source.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "timg:GetImagingSettings")]
pub struct GetImagingSettings {
    #[serde(rename = "timg:VideoSourceToken")]
    pub video_source_token: String,
}

impl OnvifRequest for GetImagingSettings {
    fn category(&self) -> Category {
        Category::Imaging
    }
}
