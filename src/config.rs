use std::{collections::BTreeMap, fs, path::Path};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::forces::Quadrant;

pub const SIM_HZ: f32 = 60.0;
pub const RENDER_HZ: f32 = 30.0;
pub const DT: f32 = 1.0 / SIM_HZ;

pub const CANVAS_WIDTH: f32 = 1200.0;
pub const CANVAS_HEIGHT: f32 = 800.0;

pub const CIRCLE_MIN_RADIUS: f32 = 10.0;
pub const CIRCLE_MAX_RADIUS: f32 = 80.0;

pub const FORCE_STRENGTH: f32 = 0.05;
pub const PROJECTION_STRETCH_Y: f32 = 0.25;
pub const COLLIDE_PADDING: f32 = 1.0;

pub const ALPHA_MIN: f32 = 0.001;
pub const SETTLE_ALPHA_TARGET: f32 = 0.5;
pub const SETTLE_TICKS: u32 = 120;
pub const SETTLE_MAX_TICKS: u32 = 600;
/// Largest per-tick step, in canvas pixels, at which a settle may end.
pub const SETTLE_DISPLACEMENT: f32 = 0.005;
pub const VELOCITY_DECAY: f32 = 0.4;
pub const COLLISION_ITERATIONS: u32 = 1;
pub const JIGGLE: f32 = 1.0e-6;

/// Smallest value a log or sqrt scale domain may start at.
pub const MIN_POSITIVE_DOMAIN: f64 = 1.0e-6;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_DATA_PATH: &str = "data/countries.json";
pub const DEFAULT_CONTINENTS_PATH: &str = "data/continent-names.json";

/// `1 - alpha_min^(1/300)`: cools from 1 to `alpha_min` in roughly 300 ticks.
pub fn default_alpha_decay() -> f32 {
    1.0 - ALPHA_MIN.powf(1.0 / 300.0)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub canvas: CanvasSettings,
    pub circles: CircleSettings,
    pub forces: ForceSettings,
    pub simulation: SimulationSettings,
    /// Overrides for the continent to quadrant table.
    pub quadrants: BTreeMap<String, Quadrant>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CircleSettings {
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for CircleSettings {
    fn default() -> Self {
        Self {
            min_radius: CIRCLE_MIN_RADIUS,
            max_radius: CIRCLE_MAX_RADIUS,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForceSettings {
    pub strength: f32,
    pub projection_stretch_y: f32,
    pub collide_padding: f32,
}

impl Default for ForceSettings {
    fn default() -> Self {
        Self {
            strength: FORCE_STRENGTH,
            projection_stretch_y: PROJECTION_STRETCH_Y,
            collide_padding: COLLIDE_PADDING,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub settle_alpha_target: f32,
    /// Minimum settle length.
    pub settle_ticks: u32,
    pub settle_max_ticks: u32,
    pub settle_displacement: f32,
    pub velocity_decay: f32,
    pub collision_iterations: u32,
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            alpha_min: ALPHA_MIN,
            alpha_decay: default_alpha_decay(),
            settle_alpha_target: SETTLE_ALPHA_TARGET,
            settle_ticks: SETTLE_TICKS,
            settle_max_ticks: SETTLE_MAX_TICKS,
            settle_displacement: SETTLE_DISPLACEMENT,
            velocity_decay: VELOCITY_DECAY,
            collision_iterations: COLLISION_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("no configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::Validation(msg));

        let CanvasSettings { width, height } = self.canvas;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return fail(format!("canvas must be positive and finite, got {width}x{height}"));
        }
        let CircleSettings {
            min_radius,
            max_radius,
        } = self.circles;
        if !(min_radius > 0.0 && max_radius.is_finite()) || max_radius < min_radius {
            return fail(format!(
                "circle radii must satisfy 0 < min <= max, got {min_radius}..{max_radius}"
            ));
        }
        let strength = self.forces.strength;
        if !(strength > 0.0 && strength <= 1.0) {
            return fail(format!("force strength must be in (0, 1], got {strength}"));
        }
        let padding = self.forces.collide_padding;
        if !(padding.is_finite() && padding >= 0.0) {
            return fail(format!("collide padding must be finite and >= 0, got {padding}"));
        }
        let sim = &self.simulation;
        if !(0.0..1.0).contains(&sim.velocity_decay) {
            return fail(format!(
                "velocity decay must be in [0, 1), got {}",
                sim.velocity_decay
            ));
        }
        for (name, value) in [
            ("alpha_min", sim.alpha_min),
            ("alpha_decay", sim.alpha_decay),
            ("settle_alpha_target", sim.settle_alpha_target),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return fail(format!("{name} must be in (0, 1), got {value}"));
            }
        }
        if sim.collision_iterations == 0 {
            return fail("collision_iterations must be at least 1".to_string());
        }
        if sim.settle_max_ticks < sim.settle_ticks {
            return fail(format!(
                "settle_max_ticks ({}) must not be below settle_ticks ({})",
                sim.settle_max_ticks, sim.settle_ticks
            ));
        }
        let step = sim.settle_displacement;
        if !(step.is_finite() && step > 0.0) {
            return fail(format!("settle_displacement must be positive, got {step}"));
        }
        Ok(())
    }
}
