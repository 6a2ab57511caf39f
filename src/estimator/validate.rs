use serde::Serialize;

use crate::estimator::{EstimateError, Query};

pub const MAX_SAME_SPECIES: i64 = 10;

/// A numeric form input as the user typed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormNumber {
    Whole(i64),
    Fractional(f64),
    NotANumber,
}

impl FormNumber {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(value) = raw.parse::<i64>() {
            return Self::Whole(value);
        }
        match raw.parse::<f64>() {
            Ok(value) => Self::from_f64(value),
            Err(_) => Self::NotANumber,
        }
    }

    /// `None` for JSON `null`; strings, booleans and containers are not numbers.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Number(number) => Some(if let Some(v) = number.as_i64() {
                Self::Whole(v)
            } else if number.is_u64() {
                // Above i64::MAX; out of range either way.
                Self::Whole(i64::MAX)
            } else {
                number.as_f64().map_or(Self::NotANumber, Self::from_f64)
            }),
            _ => Some(Self::NotANumber),
        }
    }

    fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            Self::NotANumber
        } else if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Self::Whole(value as i64)
        } else {
            Self::Fractional(value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

fn push_issue(issues: &mut Vec<FieldIssue>, field: &'static str, message: impl Into<String>) {
    if let Some(issue) = issues.iter_mut().find(|issue| issue.field == field) {
        issue.messages.push(message.into());
    } else {
        issues.push(FieldIssue {
            field,
            messages: vec![message.into()],
        });
    }
}

/// The whole-number value of `raw` within `range`, recording an issue otherwise.
fn whole_in_range(
    issues: &mut Vec<FieldIssue>,
    field: &'static str,
    raw: Option<FormNumber>,
    range: std::ops::RangeInclusive<i64>,
) -> Option<i64> {
    match raw {
        None => push_issue(issues, field, "value is required"),
        Some(FormNumber::NotANumber) => push_issue(issues, field, "must be a number"),
        Some(FormNumber::Fractional(_)) => push_issue(issues, field, "must be a whole number"),
        Some(FormNumber::Whole(n)) if !range.contains(&n) => push_issue(
            issues,
            field,
            format!("must be between {} and {}", range.start(), range.end()),
        ),
        Some(FormNumber::Whole(n)) => return Some(n),
    }
    None
}

/// Check raw form inputs and build a [`Query`]. Every failing field is
/// reported, not just the first.
pub fn validate_query(
    villager: Option<&str>,
    tickets: Option<FormNumber>,
    same_species: Option<FormNumber>,
) -> Result<Query, EstimateError> {
    let mut issues = Vec::new();

    let villager = villager.filter(|name| !name.trim().is_empty());
    if villager.is_none() {
        push_issue(&mut issues, "villager", "select a villager");
    }
    let tickets = whole_in_range(&mut issues, "tickets", tickets, 1..=i64::from(u32::MAX));
    let same_species = whole_in_range(
        &mut issues,
        "same_species",
        same_species,
        0..=MAX_SAME_SPECIES,
    );

    match (villager, tickets, same_species) {
        (Some(villager), Some(tickets), Some(same_species)) if issues.is_empty() => Ok(Query {
            villager: villager.to_string(),
            tickets: u32::try_from(tickets).map_err(|_| EstimateError::Validation(Vec::new()))?,
            same_species: u32::try_from(same_species)
                .map_err(|_| EstimateError::Validation(Vec::new()))?,
        }),
        _ => Err(EstimateError::Validation(issues)),
    }
}
