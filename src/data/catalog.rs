//! Villager catalog: loaded once at startup and shared read-only by every
//! request. Lookups by name and species are case-insensitive.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::data::villager::{read_villagers_csv, Villager};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unable to open catalog '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: empty {field}")]
    EmptyField { row: usize, field: &'static str },
    #[error("row {row}: duplicate villager name '{name}'")]
    DuplicateName { row: usize, name: String },
    #[error("catalog contains no villagers")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesSummary {
    pub species: String,
    pub villagers: usize,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    villagers: Vec<Villager>,
    by_name: HashMap<String, usize>,
    species: Vec<SpeciesSummary>,
    species_index: HashMap<String, usize>,
}

/// Names match ignoring case only; loaded fields are already trimmed.
fn lookup_key(s: &str) -> String {
    s.to_lowercase()
}

impl Catalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Self::from_villagers(read_villagers_csv(reader)?)
    }

    /// Build the lookup indexes. Names must be unique ignoring case so that a
    /// lookup resolves to exactly one row.
    pub fn from_villagers(villagers: Vec<Villager>) -> Result<Self, CatalogError> {
        if villagers.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_name = HashMap::with_capacity(villagers.len());
        let mut species: Vec<SpeciesSummary> = Vec::new();
        let mut species_index = HashMap::new();

        for (index, villager) in villagers.iter().enumerate() {
            if by_name.insert(lookup_key(&villager.name), index).is_some() {
                return Err(CatalogError::DuplicateName {
                    row: index + 1,
                    name: villager.name.clone(),
                });
            }

            let slot = *species_index
                .entry(lookup_key(&villager.species))
                .or_insert_with(|| {
                    species.push(SpeciesSummary {
                        species: villager.species.clone(),
                        villagers: 0,
                    });
                    species.len() - 1
                });
            species[slot].villagers += 1;
        }

        Ok(Self {
            villagers,
            by_name,
            species,
            species_index,
        })
    }

    pub fn len(&self) -> usize {
        self.villagers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.villagers.is_empty()
    }

    pub fn villagers(&self) -> &[Villager] {
        &self.villagers
    }

    /// Case-insensitive exact match on name.
    pub fn find(&self, name: &str) -> Option<&Villager> {
        self.by_name
            .get(&lookup_key(name))
            .map(|&index| &self.villagers[index])
    }

    /// Distinct species, in the order they first appear in the dataset.
    pub fn species(&self) -> &[SpeciesSummary] {
        &self.species
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Number of villagers sharing `species`, ignoring case. Zero if unknown.
    pub fn species_members(&self, species: &str) -> usize {
        self.species_index
            .get(&lookup_key(species))
            .map_or(0, |&slot| self.species[slot].villagers)
    }

    pub fn villagers_of_species(&self, species: &str) -> impl Iterator<Item = &Villager> + '_ {
        let key = lookup_key(species);
        self.villagers
            .iter()
            .filter(move |villager| lookup_key(&villager.species) == key)
    }
}
