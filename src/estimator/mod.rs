//! Odds of meeting a particular villager on mystery-island tours.
//!
//! Each ticket picks a species uniformly, then a villager of that species
//! uniformly among those not already living on the island. The chance of the
//! first hit within a run of tickets follows a negative binomial with one
//! required success.

pub mod distribution;
pub mod validate;

use serde::Serialize;
use thiserror::Error;

use crate::data::{Catalog, Villager};
use distribution::FirstSuccess;
pub use validate::{validate_query, FieldIssue, FormNumber, MAX_SAME_SPECIES};

/// Largest number of points plotted; longer runs are sampled evenly.
pub const MAX_SERIES_POINTS: u32 = 10_000;

pub const VALIDATION_MESSAGE: &str = "Please select a villager, enter a valid number of attempts, and enter a valid number of villagers of the same species.";

pub const CHART_TITLE: &str = "Probability of finding your dream villager";
pub const CHART_X_AXIS: &str = "Nook Mile Tickets";
pub const CHART_Y_AXIS: &str = "Probability (%)";

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("{}", VALIDATION_MESSAGE)]
    Validation(Vec<FieldIssue>),
    #[error("Villager '{0}' not found in the dataset.")]
    NotFound(String),
    #[error("invalid success probability {0}")]
    Probability(f64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub villager: String,
    pub tickets: u32,
    pub same_species: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub tickets: u32,
    pub probability_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub villager: String,
    pub species: String,
    pub species_total: usize,
    pub villagers_in_species: usize,
    pub same_species: u32,
    pub tickets: u32,
    pub single_attempt_probability: f64,
    pub tickets_probability: f64,
    /// Set when `same_species` left fewer than one candidate in the species
    /// and the per-species term was clamped to 1.
    pub held_clamped: bool,
    /// Set when the curve was thinned to [`MAX_SERIES_POINTS`].
    pub series_sampled: bool,
    pub series: Vec<SeriesPoint>,
}

/// Single-ticket probability of meeting `villager`, plus whether the held
/// count had to be clamped.
pub fn single_attempt_probability(
    catalog: &Catalog,
    villager: &str,
    same_species: u32,
) -> Result<(f64, bool), EstimateError> {
    let found = catalog
        .find(villager)
        .ok_or_else(|| EstimateError::NotFound(villager.to_string()))?;
    Ok(villager_odds(catalog, found, same_species))
}

fn villager_odds(catalog: &Catalog, villager: &Villager, same_species: u32) -> (f64, bool) {
    let species_total = catalog.species_count().max(1) as f64;
    let members = catalog.species_members(&villager.species).max(1) as i64;
    let remaining = members - i64::from(same_species);
    let clamped = remaining < 1;

    let p = (1.0 / species_total) * (1.0 / remaining.max(1) as f64);
    (p, clamped)
}

/// Ticket counts plotted for a curve ending at `last`, and whether they were
/// sampled. `last` is always included.
fn series_ticks(last: u32) -> (Vec<u32>, bool) {
    if last <= MAX_SERIES_POINTS {
        return ((1..=last).collect(), false);
    }
    let last = u64::from(last);
    let step = (last - 1).div_ceil(u64::from(MAX_SERIES_POINTS) - 1);
    let mut ticks: Vec<u32> = (0..)
        .map(|i: u64| 1 + i * step)
        .take_while(|&tick| tick < last)
        .filter_map(|tick| u32::try_from(tick).ok())
        .collect();
    ticks.extend(u32::try_from(last).ok());
    (ticks, true)
}

pub fn estimate(catalog: &Catalog, query: &Query) -> Result<Estimate, EstimateError> {
    let found = catalog
        .find(&query.villager)
        .ok_or_else(|| EstimateError::NotFound(query.villager.clone()))?;
    let (p, held_clamped) = villager_odds(catalog, found, query.same_species);
    let dist = FirstSuccess::new(p).map_err(|_| EstimateError::Probability(p))?;

    // The curve stops one short of the requested ticket count.
    let (ticks, series_sampled) = series_ticks(query.tickets.saturating_sub(1));
    let series = ticks
        .into_iter()
        .map(|tickets| SeriesPoint {
            tickets,
            probability_pct: dist.cdf_pct(tickets),
        })
        .collect();

    Ok(Estimate {
        villager: found.name.clone(),
        species: found.species.clone(),
        species_total: catalog.species_count(),
        villagers_in_species: catalog.species_members(&found.species),
        same_species: query.same_species,
        tickets: query.tickets,
        single_attempt_probability: p,
        tickets_probability: dist.cdf(query.tickets),
        held_clamped,
        series_sampled,
        series,
    })
}

impl Estimate {
    pub fn single_attempt_pct(&self) -> f64 {
        self.single_attempt_probability * 100.0
    }

    pub fn tickets_pct(&self) -> f64 {
        self.tickets_probability * 100.0
    }

    /// User-facing summary. A single ticket reports only the per-ticket odds.
    pub fn message(&self) -> String {
        if self.tickets == 1 {
            return format!(
                "The probability of finding {} with 1 Nook Mile Ticket is: {:.2}%",
                self.villager,
                self.single_attempt_pct()
            );
        }
        format!(
            "The probability of finding {name} in a single attempt is: {single:.2}%\n\n and the probability of finding {name} with {tickets} Nook Mile Tickets is: {total:.2}%",
            name = self.villager,
            single = self.single_attempt_pct(),
            tickets = self.tickets,
            total = self.tickets_pct(),
        )
    }
}
