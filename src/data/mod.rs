//! JSON loading for the country list and the continent display names.

use std::{collections::HashMap, fs, path::Path};

use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    core::store::EntityInput,
    error::{Error, Result},
    types::Category,
};

/// One row of `countries.json`. Numbers may arrive as JSON numbers or as
/// numeric strings, since the dataset started life as a CSV export.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CountryRecord {
    country_code: String,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    population: Value,
    continent_code: String,
    #[serde(default)]
    center_longitude: Value,
    #[serde(default)]
    center_latitude: Value,
}

/// Continent code to display name, falling back to the code itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContinentNames(HashMap<String, String>);

impl ContinentNames {
    pub fn name<'a>(&'a self, category: &'a Category) -> &'a str {
        self.0
            .get(category.as_str())
            .map(String::as_str)
            .unwrap_or(category.as_str())
    }
}

pub fn load_countries(path: impl AsRef<Path>) -> Result<Vec<EntityInput>> {
    let path = path.as_ref();
    let content = read(path)?;
    let inputs = parse_countries(&content, &path.display().to_string())?;
    info!("loaded {} countries from {}", inputs.len(), path.display());
    Ok(inputs)
}

pub fn parse_countries(content: &str, origin: &str) -> Result<Vec<EntityInput>> {
    let records: Vec<CountryRecord> =
        serde_json::from_str(content).map_err(|source| Error::Json {
            path: origin.to_string(),
            source,
        })?;
    records.into_iter().map(into_input).collect()
}

pub fn load_continent_names(path: impl AsRef<Path>) -> Result<ContinentNames> {
    let path = path.as_ref();
    let content = read(path)?;
    let names: HashMap<String, String> =
        serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.display().to_string(),
            source,
        })?;
    Ok(ContinentNames(names))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}

fn into_input(record: CountryRecord) -> Result<EntityInput> {
    let id = record.country_code.trim().to_string();
    let population = match numeric(&record.population) {
        Some(Ok(value)) => value,
        Some(Err(raw)) => {
            return Err(Error::invalid(&id, format!("population {raw} is not numeric")));
        }
        None => return Err(Error::invalid(&id, "population is missing")),
    };
    let longitude = coordinate(&id, "longitude", &record.center_longitude)?;
    let latitude = coordinate(&id, "latitude", &record.center_latitude)?;
    Ok(EntityInput {
        name: record.country_name.unwrap_or_else(|| id.clone()),
        id,
        population,
        category: record.continent_code.trim().to_string(),
        longitude,
        latitude,
    })
}

fn coordinate(id: &str, axis: &str, value: &Value) -> Result<Option<f64>> {
    match numeric(value) {
        Some(Ok(v)) => Ok(Some(v)),
        Some(Err(raw)) => Err(Error::invalid(id, format!("{axis} {raw} is not numeric"))),
        None => Ok(None),
    }
}

/// `None` for absent values, `Err` carrying the raw text for non-numeric ones.
fn numeric(value: &Value) -> Option<std::result::Result<f64, String>> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(Ok),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().parse::<f64>().map_err(|_| format!("{s:?}"))),
        other => Some(Err(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    mod parse_countries {
        use super::*;

        #[test]
        fn reads_numbers_and_numeric_strings() {
            let inputs = parse_countries(
                r#"[
                    {"CountryCode": "FR", "CountryName": "France", "Population": 66991000,
                     "ContinentCode": "EU", "CenterLongitude": 2.2, "CenterLatitude": 46.2},
                    {"CountryCode": "JP", "CountryName": "Japan", "Population": "126529100",
                     "ContinentCode": "AS", "CenterLongitude": "138.25", "CenterLatitude": "36.2"}
                ]"#,
                "inline",
            )
            .unwrap();
            assert_eq!(inputs.len(), 2);
            assert_eq!(inputs[0].id, "FR");
            assert_eq!(inputs[0].population, 66_991_000.0);
            assert_eq!(inputs[1].population, 126_529_100.0);
            assert_eq!(inputs[1].longitude, Some(138.25));
            assert_eq!(inputs[1].category, "AS");
        }

        #[test]
        fn non_numeric_population_is_invalid_entity() {
            let err = parse_countries(
                r#"[{"CountryCode": "XX", "Population": "lots", "ContinentCode": "EU",
                     "CenterLongitude": 0, "CenterLatitude": 0}]"#,
                "inline",
            )
            .unwrap_err();
            assert!(matches!(err, Error::InvalidEntityData { ref id, .. } if id == "XX"));
        }

        #[test]
        fn missing_population_is_invalid_entity() {
            let err = parse_countries(
                r#"[{"CountryCode": "XX", "ContinentCode": "EU",
                     "CenterLongitude": 0, "CenterLatitude": 0}]"#,
                "inline",
            )
            .unwrap_err();
            assert!(matches!(err, Error::InvalidEntityData { .. }));
        }

        #[test]
        fn missing_coordinates_pass_through_as_none() {
            let inputs = parse_countries(
                r#"[{"CountryCode": "XX", "Population": 5, "ContinentCode": "EU",
                     "CenterLatitude": ""}]"#,
                "inline",
            )
            .unwrap();
            assert_eq!(inputs[0].longitude, None);
            assert_eq!(inputs[0].latitude, None);
            assert_eq!(inputs[0].name, "XX");
        }

        #[test]
        fn malformed_json_reports_origin() {
            let err = parse_countries("{ nope", "countries.json").unwrap_err();
            assert!(matches!(err, Error::Json { ref path, .. } if path == "countries.json"));
        }
    }

    mod files {
        use super::*;

        #[test]
        fn loads_countries_from_disk() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(
                file,
                r#"[{{"CountryCode": "BR", "Population": 209288278, "ContinentCode": "SA",
                     "CenterLongitude": -53.1, "CenterLatitude": -10.8}}]"#
            )
            .unwrap();
            let inputs = load_countries(file.path()).unwrap();
            assert_eq!(inputs[0].id, "BR");
        }

        #[test]
        fn missing_file_is_io_error() {
            assert!(matches!(
                load_countries("/no/such/countries.json"),
                Err(Error::Io { .. })
            ));
        }

        #[test]
        fn bundled_dataset_builds_a_store() {
            let root = Path::new(env!("CARGO_MANIFEST_DIR"));
            let inputs = load_countries(root.join(crate::config::DEFAULT_DATA_PATH)).unwrap();
            let store = crate::core::store::EntityStore::build(
                inputs,
                &crate::config::CircleSettings::default(),
            )
            .unwrap();
            let names =
                load_continent_names(root.join(crate::config::DEFAULT_CONTINENTS_PATH)).unwrap();
            for category in store.categories() {
                assert_ne!(names.name(category), category.as_str());
            }
        }

        #[test]
        fn continent_names_fall_back_to_code() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"{{"EU": "Europe", "AS": "Asia"}}"#).unwrap();
            let names = load_continent_names(file.path()).unwrap();
            assert_eq!(names.name(&Category::new("EU")), "Europe");
            assert_eq!(names.name(&Category::new("AN")), "AN");
        }
    }
}
