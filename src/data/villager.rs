use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::data::catalog::CatalogError;

pub const DEFAULT_CATALOG_PATH: &str = "data/villagers.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Villager {
    pub name: String,
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
}

impl Villager {
    pub fn new(name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            gender: None,
            personality: None,
        }
    }
}

/// One dataset row. Columns other than these are ignored.
#[derive(Debug, Deserialize)]
struct VillagerRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Species")]
    species: String,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Personality", default)]
    personality: Option<String>,
}

/// Read villager rows from CSV with a header line. Rows with an empty name or
/// species are rejected with their 1-based data row number.
pub fn read_villagers_csv<R: Read>(reader: R) -> Result<Vec<Villager>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut villagers = Vec::new();
    for (index, record) in reader.deserialize::<VillagerRecord>().enumerate() {
        let row = index + 1;
        let record = record?;
        if record.name.is_empty() {
            return Err(CatalogError::EmptyField { row, field: "Name" });
        }
        if record.species.is_empty() {
            return Err(CatalogError::EmptyField {
                row,
                field: "Species",
            });
        }
        villagers.push(Villager {
            name: record.name,
            species: record.species,
            gender: record.gender.filter(|value| !value.is_empty()),
            personality: record.personality.filter(|value| !value.is_empty()),
        });
    }

    Ok(villagers)
}
