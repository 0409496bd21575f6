// This is free and unencumbered software released into the public domain.

use crate::shared::BridgeError;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Integer handle naming a native object across the message boundary.
pub type Identifier = i64;

/// Resolution record as it travels over the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionInfo {
    pub width: i64,
    pub height: i64,
}

/// Native pixel dimensions.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[display("{width}x{height}")]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<Size> for ResolutionInfo {
    fn from(size: Size) -> Self {
        Self {
            width: i64::from(size.width),
            height: i64::from(size.height),
        }
    }
}

impl TryFrom<ResolutionInfo> for Size {
    type Error = BridgeError;

    fn try_from(info: ResolutionInfo) -> Result<Self, Self::Error> {
        let width = u32::try_from(info.width)
            .map_err(|_| BridgeError::invalid_argument(format!("width {}", info.width)))?;
        let height = u32::try_from(info.height)
            .map_err(|_| BridgeError::invalid_argument(format!("height {}", info.height)))?;
        Ok(Self { width, height })
    }
}

/// Display rotation, in quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl TryFrom<i64> for Rotation {
    type Error = BridgeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Rotation0),
            1 => Ok(Self::Rotation90),
            2 => Ok(Self::Rotation180),
            3 => Ok(Self::Rotation270),
            _ => Err(BridgeError::invalid_argument(format!("rotation {value}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LensFacing {
    Front,
    #[default]
    Back,
    External,
    Unknown,
}

/// Output transform handed to the native side together with a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformationInfo {
    pub target_rotation: Rotation,
    pub horizontal_flip: bool,
}

impl TransformationInfo {
    /// Front lenses are mirrored; every other facing is left as is.
    pub fn for_lens(facing: LensFacing) -> Self {
        Self {
            target_rotation: Rotation::Rotation0,
            horizontal_flip: facing == LensFacing::Front,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    Ratio4x3,
    #[default]
    Ratio16x9,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FallbackRule {
    None,
    #[default]
    Auto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResolutionSelector {
    pub aspect_ratio: AspectRatio,
    pub fallback_rule: FallbackRule,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CaptureMode {
    #[default]
    MinimizeLatency,
    MaximizeQuality,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Sd,
    Hd,
    Fhd,
    Uhd,
    Lowest,
    Highest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_front_lenses_are_mirrored() {
        assert!(TransformationInfo::for_lens(LensFacing::Front).horizontal_flip);
        for facing in [LensFacing::Back, LensFacing::External, LensFacing::Unknown] {
            let info = TransformationInfo::for_lens(facing);
            assert!(!info.horizontal_flip, "{facing:?} must not be mirrored");
            assert_eq!(info.target_rotation, Rotation::Rotation0);
        }
    }

    #[test]
    fn rotation_accepts_quarter_turns_only() {
        assert_eq!(Rotation::try_from(3).unwrap(), Rotation::Rotation270);
        assert!(Rotation::try_from(4).is_err());
        assert!(Rotation::try_from(-1).is_err());
    }

    #[test]
    fn negative_resolutions_are_rejected() {
        let info = ResolutionInfo { width: -1, height: 720 };
        assert!(matches!(Size::try_from(info), Err(BridgeError::InvalidArgument(_))));
    }
}
