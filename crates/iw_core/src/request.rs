use serde_json::Value;

use crate::types::HistoryRef;
use crate::{Error, Result};

pub const DEFAULT_LIMIT: usize = 4;

/// A validated recommendation request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub reading_history: Vec<HistoryRef>,
    pub limit: usize,
}

impl RecommendationRequest {
    pub fn new(reading_history: Vec<HistoryRef>, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::invalid_input("limit must be a positive integer"));
        }
        Ok(Self {
            reading_history,
            limit,
        })
    }

    /// Validates a raw JSON body of the form `{ readingHistory: [...], limit?: n }`.
    ///
    /// Bodies are checked by hand instead of through a derived `Deserialize`
    /// so each shape problem gets its own message.
    pub fn from_value(body: Value) -> Result<Self> {
        let Value::Object(mut body) = body else {
            return Err(Error::invalid_input("request body must be a JSON object"));
        };

        let history = match body.remove("readingHistory") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => {
                return Err(Error::invalid_input("readingHistory is required"))
            }
            Some(_) => return Err(Error::invalid_input("readingHistory must be an array")),
        };

        let reading_history = history
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let entry: HistoryRef = serde_json::from_value(item)
                    .map_err(|e| Error::invalid_input(format!("readingHistory[{}]: {}", i, e)))?;
                if entry.id.trim().is_empty() {
                    return Err(Error::invalid_input(format!(
                        "readingHistory[{}]: id must not be empty",
                        i
                    )));
                }
                Ok(entry)
            })
            .collect::<Result<Vec<_>>>()?;

        let limit = match body.remove("limit") {
            None | Some(Value::Null) => DEFAULT_LIMIT,
            Some(value) => parse_limit(&value)?,
        };

        Self::new(reading_history, limit)
    }
}

impl TryFrom<Value> for RecommendationRequest {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

/// Whole positive numbers are accepted at any magnitude; anything past
/// `usize::MAX` saturates and the scorer clamps it to its own maximum.
fn parse_limit(value: &Value) -> Result<usize> {
    let invalid = || Error::invalid_input("limit must be a positive integer");
    if let Some(n) = value.as_u64() {
        return Ok(usize::try_from(n).unwrap_or(usize::MAX));
    }
    // JavaScript clients may send `4.0`, and integers past u64 arrive as floats
    match value.as_f64() {
        Some(n) if n.is_finite() && n.fract() == 0.0 && n > 0.0 => {
            Ok(n.min(usize::MAX as f64) as usize)
        }
        _ => Err(invalid()),
    }
}
