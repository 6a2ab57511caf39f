use std::fmt;

use axum::extract::Query;
use axum::http::Uri;
use serde::{Deserialize, Serialize};

use crate::data::{Catalog, SpeciesSummary, Villager};
use crate::estimator::{
    estimate, validate_query, Estimate, EstimateError, FieldIssue, FormNumber, SeriesPoint, CHART_TITLE,
    CHART_X_AXIS, CHART_Y_AXIS, VALIDATION_MESSAGE,
};
use crate::server::AppState;

/// Numbers stay as raw JSON so a fractional or quoted value is reported per
/// field instead of failing the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EstimateRequest {
    pub villager: Option<String>,
    pub tickets: serde_json::Value,
    pub same_species: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VillagerFilter {
    pub species: Option<String>,
}

impl VillagerFilter {
    /// Filter from the query string of `path`; an unparseable query means no filter.
    pub fn from_path(path: &str) -> Self {
        path.parse::<Uri>()
            .ok()
            .and_then(|uri| Query::<Self>::try_from_uri(&uri).ok())
            .map(|Query(filter)| filter)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartLayout {
    pub title: &'static str,
    pub x_axis: &'static str,
    pub y_axis: &'static str,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            title: CHART_TITLE,
            x_axis: CHART_X_AXIS,
            y_axis: CHART_Y_AXIS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimateResponse {
    pub status: &'static str,
    pub message: String,
    pub single_attempt_pct: f64,
    pub tickets_pct: f64,
    #[serde(flatten)]
    pub estimate: Estimate,
    pub chart: ChartLayout,
    pub notes: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<FieldIssue>,
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug)]
pub enum EstimatePayloadError {
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
    NotFound(String),
    Internal(String),
}

impl fmt::Display for EstimatePayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "{VALIDATION_MESSAGE}"),
            Self::NotFound(message) | Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for EstimatePayloadError {}

pub const SERIES_SAMPLED_NOTE: &str =
    "chart series sampled evenly; tickets_probability covers the full ticket count";

pub fn health_payload(state: &AppState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "villager-odds",
        "version": env!("CARGO_PKG_VERSION"),
        "villagers": state.catalog.len(),
        "species": state.catalog.species_count(),
        "loaded_at": state.loaded_at,
    }))
}

fn list_villagers<'a>(catalog: &'a Catalog, species: Option<&str>) -> Vec<&'a Villager> {
    match species.map(str::trim).filter(|s| !s.is_empty()) {
        Some(species) => catalog.villagers_of_species(species).collect(),
        None => catalog.villagers().iter().collect(),
    }
}

pub fn villagers_payload(state: &AppState, path: &str) -> Result<String, serde_json::Error> {
    let filter = VillagerFilter::from_path(path);
    let list = list_villagers(&state.catalog, filter.species.as_deref());
    serde_json::to_string_pretty(&serde_json::json!({ "villagers": list }))
}

pub fn species_payload(state: &AppState) -> Result<String, serde_json::Error> {
    let list: &[SpeciesSummary] = state.catalog.species();
    serde_json::to_string_pretty(&serde_json::json!({ "species": list }))
}

pub fn estimate_payload(state: &AppState, body: &str) -> Result<String, EstimatePayloadError> {
    let req: EstimateRequest = serde_json::from_str(body).map_err(EstimatePayloadError::Parse)?;

    let query = validate_query(
        req.villager.as_deref(),
        FormNumber::from_json(&req.tickets),
        FormNumber::from_json(&req.same_species),
    )
    .map_err(payload_error)?;
    let result = estimate(&state.catalog, &query).map_err(payload_error)?;

    let mut notes = Vec::new();
    if result.held_clamped {
        notes.push("same-species count meets or exceeds the species size; odds assume one candidate remains");
    }
    if result.series_sampled {
        notes.push(SERIES_SAMPLED_NOTE);
    }

    let response = EstimateResponse {
        status: "ok",
        message: result.message(),
        single_attempt_pct: result.single_attempt_pct(),
        tickets_pct: result.tickets_pct(),
        estimate: result,
        chart: ChartLayout::default(),
        notes,
    };
    serde_json::to_string_pretty(&response)
        .map_err(|err| EstimatePayloadError::Internal(err.to_string()))
}

fn payload_error(err: EstimateError) -> EstimatePayloadError {
    match err {
        EstimateError::Validation(errors) => {
            EstimatePayloadError::Validation(ValidationErrorResponse {
                status: "error",
                message: VALIDATION_MESSAGE,
                errors,
                series: Vec::new(),
            })
        }
        EstimateError::NotFound(_) => EstimatePayloadError::NotFound(err.to_string()),
        EstimateError::Probability(_) => EstimatePayloadError::Internal(err.to_string()),
    }
}
