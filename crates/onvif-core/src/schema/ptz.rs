//! PTZ service operations (`tptz` namespace).

use serde::Serialize;

use super::{Category, OnvifRequest};

/// Pan/tilt speed vector, serialized as attributes per the ONVIF schema.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PanTilt {
    #[serde(rename = "@x")]
    pub x: f32,
    #[serde(rename = "@y")]
    pub y: f32,
}

/// Zoom speed, serialized as an attribute.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Zoom {
    #[serde(rename = "@x")]
    pub x: f32,
}

/// Movement velocity for [`ContinuousMove`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Velocity {
    #[serde(rename = "onvif:PanTilt")]
    pub pan_tilt: PanTilt,
    #[serde(rename = "onvif:Zoom")]
    pub zoom: Zoom,
}

/// Starts a continuous pan/tilt/zoom movement at the given velocity.
/// Movement continues until [`Stop`] is issued.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "tptz:ContinuousMove")]
pub struct ContinuousMove {
    #[serde(rename = "tptz:ProfileToken")]
    pub profile_token: String,
    #[serde(rename = "tptz:Velocity")]
    pub velocity: Velocity,
}

/// Stops pan/tilt and/or zoom movement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "tptz:Stop")]
pub struct Stop {
    #[serde(rename = "tptz:ProfileToken")]
    pub profile_token: String,
    #[serde(rename = "tptz:PanTilt")]
    pub pan_tilt: bool,
    #[serde(rename = "tptz:Zoom")]
    pub zoom: bool,
}

/// Moves the camera to its configured home position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "tptz:GotoHomePosition")]
pub struct GotoHomePosition {
    #[serde(rename = "tptz:ProfileToken")]
    pub profile_token: String,
}

impl OnvifRequest for ContinuousMove {
    fn category(&self) -> Category {
        Category::Ptz
    }
}

impl OnvifRequest for Stop {
    fn category(&self) -> Category {
        Category::Ptz
    }
}

impl OnvifRequest for GotoHomePosition {
    fn category(&self) -> Category {
        Category::Ptz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous_move_serializes_velocity_attributes() {
        let xml = ContinuousMove {
            profile_token: "profile_1".to_string(),
            velocity: Velocity {
                pan_tilt: PanTilt { x: 0.5, y: -0.25 },
                zoom: Zoom { x: 0.0 },
            },
        }
        .to_xml()
        .unwrap();
        assert!(xml.contains("<tptz:ProfileToken>profile_1</tptz:ProfileToken>"));
        assert!(xml.contains("<onvif:PanTilt x=\"0.5\" y=\"-0.25\"/>"));
        assert!(xml.contains("<onvif:Zoom x="));
    }

    #[test]
    fn test_ptz_operations_route_to_ptz_category() {
        let stop = Stop {
            profile_token: "profile_1".to_string(),
            pan_tilt: true,
            zoom: true,
        };
        assert_eq!(stop.category(), Category::Ptz);
    }
}
