//! Target-position forces, one x/y pair per layout mode.

use std::{collections::HashMap, fmt};

use log::debug;
use serde::Deserialize;

use crate::{
    config::Settings,
    core::store::EntityStore,
    scale::{BandScale, Equirectangular, LogScale},
    types::{Category, Entity, LayoutMode, Vec2},
};

type TargetFn = Box<dyn Fn(&Entity) -> f32>;

/// Pulls a body along one axis toward `target(entity)`, closing
/// `strength * alpha` of the gap per tick.
pub struct AxisForce {
    target: TargetFn,
    strength: f32,
}

impl AxisForce {
    pub fn new(strength: f32, target: impl Fn(&Entity) -> f32 + 'static) -> Self {
        Self {
            target: Box::new(target),
            strength,
        }
    }

    pub fn target(&self, entity: &Entity) -> f32 {
        (self.target)(entity)
    }

    /// Velocity change for a body currently at `at`.
    pub fn impulse(&self, entity: &Entity, at: f32, alpha: f32) -> f32 {
        (self.target(entity) - at) * self.strength * alpha
    }
}

impl fmt::Debug for AxisForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisForce")
            .field("strength", &self.strength)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ForcePair {
    pub x: AxisForce,
    pub y: AxisForce,
}

impl ForcePair {
    pub fn target(&self, entity: &Entity) -> Vec2 {
        Vec2::new(self.x.target(entity), self.y.target(entity))
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Quadrant {
    pub fn anchor(self, width: f32, height: f32) -> Vec2 {
        let (fx, fy) = match self {
            Quadrant::TopLeft => (0.25, 0.25),
            Quadrant::TopRight => (0.75, 0.25),
            Quadrant::BottomLeft => (0.25, 0.75),
            Quadrant::BottomRight => (0.75, 0.75),
            Quadrant::Center => (0.5, 0.5),
        };
        Vec2::new(width * fx, height * fy)
    }
}

/// Continent to quadrant lookup; anything unmapped sits in the center.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadrantTable {
    map: HashMap<Category, Quadrant>,
}

impl QuadrantTable {
    pub fn new(entries: impl IntoIterator<Item = (Category, Quadrant)>) -> Self {
        Self {
            map: entries.into_iter().collect(),
        }
    }

    pub fn lookup(&self, category: &Category) -> Quadrant {
        self.map.get(category).copied().unwrap_or(Quadrant::Center)
    }

    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a Quadrant)>,
    ) -> Self {
        for (code, quadrant) in overrides {
            self.map.insert(Category::new(code.as_str()), *quadrant);
        }
        self
    }
}

impl Default for QuadrantTable {
    fn default() -> Self {
        Self::new([
            (Category::new("EU"), Quadrant::TopLeft),
            (Category::new("AF"), Quadrant::BottomLeft),
            (Category::new("AS"), Quadrant::TopRight),
            (Category::new("NA"), Quadrant::BottomRight),
            (Category::new("SA"), Quadrant::BottomRight),
        ])
    }
}

/// All four layouts, built once from the store and never mutated.
#[derive(Debug)]
pub struct ForceSet {
    combine: ForcePair,
    geographic: ForcePair,
    categorical: ForcePair,
    population: ForcePair,
    band: BandScale,
    log: LogScale,
}

impl ForceSet {
    pub fn build(store: &EntityStore, settings: &Settings) -> Self {
        let (width, height) = (settings.canvas.width, settings.canvas.height);
        let strength = settings.forces.strength;
        let margin = settings.circles.max_radius;
        let center = Vec2::new(width / 2.0, height / 2.0);

        let combine = ForcePair {
            x: AxisForce::new(strength, move |_| center.x),
            y: AxisForce::new(strength, move |_| center.y),
        };

        let stretch = settings.forces.projection_stretch_y;
        let projection = Equirectangular::new(
            Equirectangular::fit_width(width, margin),
            (width / 2.0, height * (1.0 - stretch) / 2.0),
        );
        let geographic = ForcePair {
            x: AxisForce::new(strength, move |e| {
                e.geo.map_or(center.x, |geo| projection.project(geo).x)
            }),
            y: AxisForce::new(strength, move |e| {
                e.geo
                    .map_or(center.y, |geo| projection.project(geo).y * (1.0 + stretch))
            }),
        };

        let table = QuadrantTable::default().with_overrides(&settings.quadrants);
        let table_y = table.clone();
        let categorical = ForcePair {
            x: AxisForce::new(strength, move |e| {
                table.lookup(&e.category).anchor(width, height).x
            }),
            y: AxisForce::new(strength, move |e| {
                table_y.lookup(&e.category).anchor(width, height).y
            }),
        };

        let band = BandScale::new(store.categories().to_vec(), (margin, width - margin * 2.0));
        let log = LogScale::new(store.population_extent(), (height - margin, margin * 2.0));
        let band_x = band.clone();
        let population = ForcePair {
            x: AxisForce::new(strength, move |e| {
                band_x.center(&e.category).unwrap_or(center.x)
            }),
            y: AxisForce::new(strength, move |e| log.apply(e.population)),
        };

        debug!(
            "built forces for {} entities across {} categories",
            store.len(),
            store.categories().len()
        );

        Self {
            combine,
            geographic,
            categorical,
            population,
            band,
            log,
        }
    }

    pub fn pair(&self, mode: LayoutMode) -> &ForcePair {
        match mode {
            LayoutMode::Combine => &self.combine,
            LayoutMode::Geographic => &self.geographic,
            LayoutMode::Categorical => &self.categorical,
            LayoutMode::PopulationScatter => &self.population,
        }
    }

    /// Scales behind the population layout, for drawing its axes.
    pub fn population_axes(&self) -> (&BandScale, &LogScale) {
        (&self.band, &self.log)
    }
}
