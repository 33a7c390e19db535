use std::collections::HashSet;

use log::warn;

use crate::{
    config::CircleSettings,
    error::{Error, Result},
    scale::SqrtScale,
    types::{Category, Entity, EntityId, GeoPoint, Vec2},
};

/// Validated-at-construction description of one country.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityInput {
    pub id: String,
    pub name: String,
    pub population: f64,
    pub category: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// The fixed set of bodies the simulation moves around.
#[derive(Debug)]
pub struct EntityStore {
    entities: Vec<Entity>,
    categories: Vec<Category>,
    extent: (f64, f64),
}

impl EntityStore {
    pub fn build(inputs: Vec<EntityInput>, circles: &CircleSettings) -> Result<Self> {
        if inputs.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let mut seen = HashSet::with_capacity(inputs.len());
        for input in &inputs {
            if input.id.trim().is_empty() {
                return Err(Error::invalid("<blank>", "country code is empty"));
            }
            if !seen.insert(input.id.as_str()) {
                return Err(Error::invalid(&input.id, "duplicate country code"));
            }
            if !input.population.is_finite() || input.population <= 0.0 {
                return Err(Error::invalid(
                    &input.id,
                    format!("population must be positive, got {}", input.population),
                ));
            }
            if input.longitude.is_none() || input.latitude.is_none() {
                return Err(Error::invalid(&input.id, "missing geo-coordinates"));
            }
        }

        let extent = inputs.iter().fold((f64::MAX, f64::MIN), |(lo, hi), e| {
            (lo.min(e.population), hi.max(e.population))
        });
        let radius_scale =
            SqrtScale::new(extent, (circles.min_radius, circles.max_radius));

        let mut categories: Vec<Category> = Vec::new();
        let mut entities = Vec::with_capacity(inputs.len());
        for input in inputs {
            let category = Category::new(input.category);
            if !categories.contains(&category) {
                categories.push(category.clone());
            }
            let (lon, lat) = (
                input.longitude.unwrap_or(f64::NAN),
                input.latitude.unwrap_or(f64::NAN),
            );
            let geo = GeoPoint::checked(lon, lat);
            if geo.is_none() {
                warn!(
                    "{}: degenerate coordinates ({lon}, {lat}), placing at canvas center",
                    input.id
                );
            }
            entities.push(Entity {
                radius: radius_scale.apply(input.population),
                id: EntityId(input.id),
                name: input.name,
                population: input.population,
                category,
                geo,
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
            });
        }

        Ok(Self {
            entities,
            categories,
            extent,
        })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Continent codes in order of first appearance.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn population_extent(&self) -> (f64, f64) {
        self.extent
    }

    pub fn max_radius(&self) -> f32 {
        self.entities
            .iter()
            .map(|e| e.radius)
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
pub(crate) fn input(id: &str, population: f64, category: &str) -> EntityInput {
    EntityInput {
        id: id.to_string(),
        name: format!("Country {id}"),
        population,
        category: category.to_string(),
        longitude: Some(0.0),
        latitude: Some(0.0),
    }
}
