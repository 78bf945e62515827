//! Display and animation preferences
//!
//! Stored as JSON. Every section is `#[serde(default)]`, so a file only
//! needs the keys it wants to change.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::board::BoardConfig;
use crate::error::Result;

/// Curve accuracy preset for shadow occluder tessellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Accuracy {
    Low,
    #[default]
    Medium,
    High,
}

impl Accuracy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accuracy::Low => "Low",
            Accuracy::Medium => "Medium",
            Accuracy::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Accuracy::Low),
            "medium" | "med" => Some(Accuracy::Medium),
            "high" => Some(Accuracy::High),
            _ => None,
        }
    }

    /// Segments around a lathed occluder (pieces, hinges)
    pub fn curve_segments(&self) -> usize {
        match self {
            Accuracy::Low => 8,
            Accuracy::Medium => 16,
            Accuracy::High => 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Vertical field of view, degrees
    pub fov_degrees: f32,
    /// Board tilt away from the viewer, degrees (0 = facing the camera)
    pub board_angle_degrees: f32,
    /// Straight-down orthographic view
    pub plan_view: bool,
    /// Show dice in a tray below the board instead of on it
    pub dice_below_board: bool,
    pub near: f32,
    pub far: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            board_angle_degrees: 20.0,
            plan_view: false,
            dice_below_board: false,
            near: 0.1,
            far: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    pub enabled: bool,
    pub accuracy: Accuracy,
    /// Light position in board units (or direction toward the light)
    pub light_position: Vec3,
    /// Point light when true, directional light when false
    pub positional: bool,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            accuracy: Accuracy::Medium,
            light_position: Vec3::new(5.0, 20.0, 25.0),
            positional: true,
        }
    }
}

impl ShadowSettings {
    /// Homogeneous light: w = 1 for a point light, w = 0 for a direction
    pub fn light(&self) -> glam::Vec4 {
        let w = if self.positional { 1.0 } else { 0.0 };
        self.light_position.extend(w)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// 1 (slowest) to 7 (fastest)
    pub speed: u8,
    /// Throw the dice along a bounce path instead of placing them
    pub animate_dice: bool,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            speed: 4,
            animate_dice: true,
        }
    }
}

impl AnimationSettings {
    pub const MIN_SPEED: u8 = 1;
    pub const MAX_SPEED: u8 = 7;

    /// Travel speed in board units per millisecond
    pub fn units_per_ms(&self, cfg: &BoardConfig) -> f32 {
        let speed = self.speed.clamp(Self::MIN_SPEED, Self::MAX_SPEED);
        cfg.piece_hole() * speed as f32 * 0.005
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board: BoardConfig,
    pub view: ViewSettings,
    pub shadows: ShadowSettings,
    pub animation: AnimationSettings,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_accuracy_names() {
        for accuracy in [Accuracy::Low, Accuracy::Medium, Accuracy::High] {
            assert_eq!(Accuracy::from_str(accuracy.as_str()), Some(accuracy));
        }
        assert_eq!(Accuracy::from_str("MED"), Some(Accuracy::Medium));
        assert_eq!(Accuracy::from_str("ultra"), None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{ "view": { "board_angle_degrees": 60.0 } }"#).unwrap();
        assert_eq!(settings.view.board_angle_degrees, 60.0);
        assert_eq!(settings.view.fov_degrees, 45.0);
        assert_eq!(settings.shadows, ShadowSettings::default());
        assert_eq!(settings.board, BoardConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.shadows.accuracy = Accuracy::High;
        settings.animation.speed = 7;
        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(Error::Settings(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            Settings::load("/nonexistent/board3d/settings.json"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_speed_is_clamped() {
        let cfg = BoardConfig::default();
        let fast = AnimationSettings {
            speed: 200,
            animate_dice: true,
        };
        let max = AnimationSettings {
            speed: AnimationSettings::MAX_SPEED,
            animate_dice: true,
        };
        assert_eq!(fast.units_per_ms(&cfg), max.units_per_ms(&cfg));
        let stopped = AnimationSettings {
            speed: 0,
            animate_dice: true,
        };
        assert!(stopped.units_per_ms(&cfg) > 0.0);
    }
}
