use std::{
    fmt,
    ops::{Add, AddAssign, Mul, Sub, SubAssign},
};

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Country code. Stable for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Continent code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Returns `None` for coordinates that cannot be projected meaningfully.
    pub fn checked(longitude: f64, latitude: f64) -> Option<Self> {
        let valid = longitude.is_finite()
            && latitude.is_finite()
            && (-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude);
        valid.then_some(Self {
            longitude,
            latitude,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub population: f64,
    pub category: Category,
    pub geo: Option<GeoPoint>,
    pub radius: f32,
    pub pos: Vec2,
    pub vel: Vec2,
}

/// What the core hands to the renderer after each tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Placement {
    pub id: EntityId,
    pub pos: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutMode {
    Combine,
    Geographic,
    Categorical,
    PopulationScatter,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 4] = [
        LayoutMode::Combine,
        LayoutMode::Geographic,
        LayoutMode::Categorical,
        LayoutMode::PopulationScatter,
    ];

    /// Geography and population place bodies literally and may overlap.
    pub fn collides(self) -> bool {
        matches!(self, LayoutMode::Combine | LayoutMode::Categorical)
    }

    pub fn label(self) -> &'static str {
        match self {
            LayoutMode::Combine => "combine",
            LayoutMode::Geographic => "country centers",
            LayoutMode::Categorical => "continents",
            LayoutMode::PopulationScatter => "population",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    #[default]
    Solid,
    Texture,
}

impl FillMode {
    pub fn toggled(self) -> Self {
        match self {
            FillMode::Solid => FillMode::Texture,
            FillMode::Texture => FillMode::Solid,
        }
    }
}

/// Integrator lifecycle. `Settling` holds a raised alpha target after a
/// layout change; it falls back to `Running` once the settle ticks run out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Settling,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SimStats {
    pub ticks: u64,
    pub alpha: f32,
    pub phase: Phase,
    pub collisions: usize,
    pub mean_speed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorId {
    White,
    Cyan,
    Blue,
    Green,
    Yellow,
    Magenta,
    Red,
    LightBlue,
    LightGreen,
    Gray,
}

impl ColorId {
    /// Categorical palette, indexed by first appearance of a continent.
    pub const PALETTE: [ColorId; 8] = [
        ColorId::Blue,
        ColorId::Yellow,
        ColorId::Green,
        ColorId::Magenta,
        ColorId::Cyan,
        ColorId::LightBlue,
        ColorId::LightGreen,
        ColorId::White,
    ];

    pub fn for_index(idx: usize) -> ColorId {
        Self::PALETTE[idx % Self::PALETTE.len()]
    }
}
