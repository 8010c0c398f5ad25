//! Drawer theme and drawing toggles
//!
//! Each `Drawer` owns its own config, so several drawers with different
//! themes can render the same world.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::consts::PICK_RADIUS;
use crate::error::ConfigError;

/// Colors and sizes per entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Shape outlines and circle angle ticks
    pub outline: Color,
    /// Awake dynamic shapes
    pub shape_fill: Color,
    /// Dynamic shapes idle longer than the sleep threshold
    pub shape_idle_fill: Color,
    /// Sleeping dynamic shapes
    pub shape_sleeping_fill: Color,
    /// Static shapes
    pub static_fill: Color,
    pub constraint: Color,
    pub collision_point: Color,
    /// Radius of anchor dots
    pub dot_radius: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            outline: Color::new(200.0 / 255.0, 210.0 / 255.0, 230.0 / 255.0, 1.0),
            shape_fill: Color::new(0.7, 0.3, 0.6, 0.5),
            shape_idle_fill: Color::new(0.66, 0.66, 0.66, 0.5),
            shape_sleeping_fill: Color::new(0.2, 0.2, 0.2, 0.5),
            static_fill: Color::new(0.2, 0.2, 0.2, 0.5),
            constraint: Color::new(0.0, 0.75, 0.0, 1.0),
            collision_point: Color::new(1.0, 0.1, 0.2, 1.0),
            dot_radius: 2.0,
        }
    }
}

/// Per-category toggles and stroke settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawOptions {
    pub static_disabled: bool,
    pub dynamic_disabled: bool,
    pub constraints_disabled: bool,
    pub collision_points_disabled: bool,

    /// Skip every fill pass
    pub fill_disabled: bool,
    /// Skip every stroke pass
    pub stroke_disabled: bool,

    pub stroke_width: f32,
    /// Requested for every fill and stroke submission
    pub anti_alias: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            static_disabled: false,
            dynamic_disabled: false,
            constraints_disabled: false,
            collision_points_disabled: false,

            fill_disabled: false,
            stroke_disabled: false,

            stroke_width: 1.0,
            anti_alias: true,
        }
    }
}

/// Full drawer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawerConfig {
    pub theme: Theme,
    pub options: DrawOptions,
    /// Pointer pick tolerance (world units)
    pub pick_radius: f32,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            options: DrawOptions::default(),
            pick_radius: PICK_RADIUS,
        }
    }
}

impl DrawerConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DrawerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject colors outside [0, 1] and negative or non-finite sizes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.theme;
        let colors = [
            ("outline", t.outline),
            ("shape_fill", t.shape_fill),
            ("shape_idle_fill", t.shape_idle_fill),
            ("shape_sleeping_fill", t.shape_sleeping_fill),
            ("static_fill", t.static_fill),
            ("constraint", t.constraint),
            ("collision_point", t.collision_point),
        ];
        for (field, color) in colors {
            if !color.is_normalized() {
                log::warn!("rejecting config: {} = {:?}", field, color);
                return Err(ConfigError::ColorOutOfRange { field });
            }
        }

        let sizes = [
            ("stroke_width", self.options.stroke_width),
            ("dot_radius", t.dot_radius),
            ("pick_radius", self.pick_radius),
        ];
        for (field, value) in sizes {
            if !value.is_finite() || value < 0.0 {
                log::warn!("rejecting config: {} = {}", field, value);
                return Err(ConfigError::NegativeWidth { field, value });
            }
        }

        Ok(())
    }
}
