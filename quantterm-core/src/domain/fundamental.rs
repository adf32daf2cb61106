//! Fundamental — one macro/fundamental observation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dated value for a named macro metric (e.g. "FEDFUNDS").
///
/// Unique on (date, metric); upserted with the same last-write-wins
/// semantics as bars. The feature pipeline forward-fills these onto the
/// bar calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fundamental {
    pub date: NaiveDate,
    pub metric: String,
    pub value: f64,
}
