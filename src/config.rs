use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Density the default geometry was tuned at. Lengths below are given in
/// those device pixels and stored in logical points; font sizes are already
/// points.
pub const DEVICE_PIXELS_PER_POINT: f32 = 2.0;

const fn points(device_px: f32) -> f32 {
    device_px / DEVICE_PIXELS_PER_POINT
}

/// Tuning tables for the scene. Every section defaults independently, so a
/// partial JSON file only overrides the values it names. All lengths are in
/// logical points.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub bounds: BoundsConfig,
    pub rect: RectConfig,
    pub fonts: FontConfig,
    pub main: MainConfig,
    pub child: ChildConfig,
    pub grandchild: GrandchildConfig,
    pub media: MediaConfig,
    pub description: DescriptionConfig,
    pub about: TextBlockConfig,
    pub text: TextBlockConfig,
    pub camera: CameraConfig,
    pub project: ProjectConfig,
    pub physics: PhysicsConfig,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub x_pad: f32,
    pub y_pad: f32,
    pub steer_margin: f32,
    pub clamp_inset: f32,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            x_pad: 0.1,
            y_pad: 0.1,
            steer_margin: 15.0,
            clamp_inset: 5.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct RectConfig {
    pub width: f32,
    pub height: f32,
    pub label_gap: f32,
    pub line_width: f32,
}

impl Default for RectConfig {
    fn default() -> Self {
        Self {
            width: points(20.0),
            height: points(36.0),
            label_gap: 8.0,
            line_width: points(2.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub main: f32,
    pub main_small: f32,
    pub child: f32,
    pub grandchild: f32,
    pub media: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            main: 16.0,
            main_small: 10.0,
            child: 16.0,
            grandchild: 16.0,
            media: 12.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct MainConfig {
    pub separation: f32,
    pub repulsion_strength: f32,
    pub wander_radius: f32,
    pub return_strength: f32,
    pub shrink_scale: f32,
    pub dim_alpha: f32,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            separation: points(300.0),
            repulsion_strength: 0.00001,
            wander_radius: points(400.0),
            return_strength: 0.008,
            shrink_scale: 0.7,
            dim_alpha: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ChildConfig {
    pub ring_radius: f32,
    pub wander_radius: f32,
    pub speed_scale: f32,
    pub min_distance: f32,
    pub sector_half_angle: f32,
    pub shrink_scale: f32,
    pub x_offset: f32,
    pub separation: f32,
    pub repulsion_strength: f32,
}

impl Default for ChildConfig {
    fn default() -> Self {
        Self {
            ring_radius: points(400.0),
            wander_radius: points(400.0),
            speed_scale: 1.0,
            min_distance: points(260.0),
            sector_half_angle: PI / 6.0,
            shrink_scale: 0.85,
            x_offset: 0.0,
            separation: 60.0,
            repulsion_strength: 0.00002,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct GrandchildConfig {
    pub wander_radius: f32,
    pub speed_scale: f32,
    pub sector_half_angle: f32,
    pub x_offset: f32,
    pub separation: f32,
    pub repulsion_strength: f32,
}

impl Default for GrandchildConfig {
    fn default() -> Self {
        Self {
            wander_radius: points(400.0),
            speed_scale: 1.0,
            sector_half_angle: PI / 3.0,
            x_offset: 0.0,
            separation: 55.0,
            repulsion_strength: 0.00002,
        }
    }
}

/// Fractions of the canvas a spawn rectangle covers.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct SpawnRect {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub size: f32,
    pub oscillation_speed: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub scale_threshold_min: usize,
    pub scale_threshold_max: usize,
    pub scale_variation: f32,
    pub separation: f32,
    pub repulsion_strength: f32,
    pub border_width: f32,
    pub bracket_padding: f32,
    pub dragged_wander_radius: f32,
    pub mobile_breakpoint: f32,
    pub desktop: SpawnRect,
    pub mobile: SpawnRect,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            size: points(600.0),
            oscillation_speed: 0.8,
            scale_min: 0.6,
            scale_max: 1.0,
            scale_threshold_min: 1,
            scale_threshold_max: 6,
            scale_variation: 0.05,
            separation: 175.0,
            repulsion_strength: 0.00002,
            border_width: points(2.0),
            bracket_padding: 8.0,
            dragged_wander_radius: 25.0,
            mobile_breakpoint: 768.0,
            desktop: SpawnRect {
                x_min: 0.35,
                x_max: 0.85,
                y_min: 0.1,
                y_max: 0.9,
            },
            mobile: SpawnRect {
                x_min: 0.05,
                x_max: 0.95,
                y_min: 0.45,
                y_max: 0.95,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPoint {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct DescriptionPlacement {
    pub x_fixed: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub anchor: AnchorPoint,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct DescriptionConfig {
    pub max_width_ratio: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub padding: f32,
    pub edge_margin: f32,
    pub desktop: DescriptionPlacement,
    pub mobile: DescriptionPlacement,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            max_width_ratio: 0.3,
            font_size: 14.0,
            line_height: 18.0,
            padding: 10.0,
            edge_margin: 25.0,
            desktop: DescriptionPlacement {
                x_fixed: 0.97,
                y_min: 0.08,
                y_max: 0.22,
                anchor: AnchorPoint::TopRight,
            },
            mobile: DescriptionPlacement {
                x_fixed: 0.04,
                y_min: 0.05,
                y_max: 0.1,
                anchor: AnchorPoint::TopLeft,
            },
        }
    }
}

/// Shared shape of the about-page and placeholder text blocks.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct TextBlockConfig {
    pub max_width_ratio: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub padding: f32,
}

impl Default for TextBlockConfig {
    fn default() -> Self {
        Self {
            max_width_ratio: 0.5,
            font_size: 14.0,
            line_height: 20.0,
            padding: 12.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub shift_per_depth: f32,
    pub ease: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            shift_per_depth: 0.03,
            ease: 0.2,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub shrink_scale: f32,
    pub dim_alpha: f32,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            shrink_scale: 0.6,
            dim_alpha: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub max_step: f32,
    pub seek_gain: f32,
    pub max_velocity: f32,
    pub integration_scale: f32,
    pub retarget_min: f32,
    pub retarget_max: f32,
    pub steer_nudge: f32,
    pub target_attempts: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_step: 0.05,
            seek_gain: 0.0025,
            max_velocity: 0.2,
            integration_scale: 40.0,
            retarget_min: 2.0,
            retarget_max: 4.5,
            steer_nudge: 0.01,
            target_attempts: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportClass {
    Mobile,
    Desktop,
}

impl ViewportClass {
    pub fn for_width(width: f32, breakpoint: f32) -> Self {
        if width <= breakpoint {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Spawn rectangles resolved for one viewport class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnLayout {
    pub media_area: SpawnRect,
    pub description: DescriptionPlacement,
}

impl SpawnLayout {
    pub fn for_width(width: f32, config: &EngineConfig) -> Self {
        match ViewportClass::for_width(width, config.media.mobile_breakpoint) {
            ViewportClass::Mobile => Self {
                media_area: config.media.mobile,
                description: config.description.mobile,
            },
            ViewportClass::Desktop => Self {
                media_area: config.media.desktop,
                description: config.description.desktop,
            },
        }
    }
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"main": {"separation": 90.0}, "camera": {"ease": 0.5}}"#)
                .unwrap();

        assert_eq!(config.main.separation, 90.0);
        assert_eq!(config.main.wander_radius, MainConfig::default().wander_radius);
        assert_eq!(config.camera.ease, 0.5);
        assert_eq!(config.media.size, MediaConfig::default().size);
    }

    #[test]
    fn anchor_points_use_kebab_case() {
        let anchor: AnchorPoint = serde_json::from_str(r#""bottom-left""#).unwrap();
        assert_eq!(anchor, AnchorPoint::BottomLeft);
    }

    #[test]
    fn default_lengths_are_device_pixels_in_points() {
        let config = EngineConfig::default();
        let device = |points: f32| points * DEVICE_PIXELS_PER_POINT;

        assert_eq!(device(config.main.separation), 300.0);
        assert_eq!(device(config.main.wander_radius), 400.0);
        assert_eq!(device(config.child.ring_radius), 400.0);
        assert_eq!(device(config.media.size), 600.0);
        assert_eq!(device(config.rect.width), 20.0);
        assert_eq!(config.fonts.main, 16.0);
    }

    #[test]
    fn spawn_layout_switches_at_breakpoint() {
        let config = EngineConfig::default();

        let narrow = SpawnLayout::for_width(600.0, &config);
        assert_eq!(narrow.media_area, config.media.mobile);
        assert_eq!(narrow.description.anchor, AnchorPoint::TopLeft);

        let wide = SpawnLayout::for_width(1440.0, &config);
        assert_eq!(wide.media_area, config.media.desktop);
        assert_eq!(wide.description.anchor, AnchorPoint::TopRight);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let error = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(error.to_string().contains("failed to read config file"));
    }
}
