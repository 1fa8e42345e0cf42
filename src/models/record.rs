//! Sale records as held by the record store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RecordId;

/// A monetary field as stored.
///
/// The store is schemaless: amounts normally arrive as JSON numbers but may
/// also be numeric strings, `null`, absent, or something else entirely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    #[default]
    Missing,
    Other(serde_json::Value),
}

impl RawAmount {
    /// Interpret the stored value as a finite number.
    ///
    /// On failure returns the raw text so the caller can report it.
    pub fn value(&self) -> Result<f64, String> {
        match self {
            RawAmount::Number(n) if n.is_finite() => Ok(*n),
            RawAmount::Number(n) => Err(n.to_string()),
            RawAmount::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(s.clone()),
            },
            RawAmount::Missing => Err("missing".to_string()),
            RawAmount::Other(v) => Err(v.to_string()),
        }
    }
}

impl From<f64> for RawAmount {
    fn from(n: f64) -> Self {
        RawAmount::Number(n)
    }
}

/// Which monetary field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountField {
    Upfront,
    Monitoring,
}

impl std::fmt::Display for AmountField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountField::Upfront => write!(f, "upfront"),
            AmountField::Monitoring => write!(f, "monitoring"),
        }
    }
}

/// A single sale. Immutable once created; the board only reads snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Store-assigned identifier
    #[serde(default, skip_serializing_if = "RecordId::is_empty")]
    pub id: RecordId,

    /// Agent name as entered
    #[serde(default)]
    pub agent: String,

    /// Upfront amount
    #[serde(default, rename = "upfront", alias = "upfrontAmount")]
    pub upfront: RawAmount,

    /// Monthly monitoring amount
    #[serde(default, rename = "monitoring", alias = "monitoringAmount")]
    pub monitoring: RawAmount,

    /// Calendar date of the sale, normally `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,

    /// Server timestamp; `None` while the store has not assigned one
    #[serde(default, rename = "timestamp", alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SaleRecord {
    /// Create a well-formed record.
    pub fn new(
        agent: impl Into<String>,
        upfront: f64,
        monitoring: f64,
        date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        let agent = agent.into();
        let date = date.format("%Y-%m-%d").to_string();
        let id = RecordId::generate(&[
            &agent,
            &date,
            &created_at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
        ]);
        Self {
            id,
            agent,
            upfront: upfront.into(),
            monitoring: monitoring.into(),
            date,
            created_at: Some(created_at),
        }
    }

    /// Replace the id.
    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = id.into();
        self
    }

    /// The sale's calendar date.
    ///
    /// Accepts a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }
}

/// Parse a stored date string into a calendar date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

/// A per-record problem found while aggregating.
///
/// Faults never abort a batch: the offending field contributes nothing and
/// the fault is reported alongside the result.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordFault {
    #[error("record {record} ({agent}): {field} amount is not a number: {raw}")]
    InvalidAmount {
        record: RecordId,
        agent: String,
        field: AmountField,
        raw: String,
    },

    #[error("record {record} ({agent}): date is not a calendar date: {raw:?}")]
    InvalidDate {
        record: RecordId,
        agent: String,
        raw: String,
    },
}

/// Errors rejecting a sale entered by hand.
#[derive(Debug, Error, PartialEq)]
pub enum SaleInputError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field} amount: {raw}")]
    InvalidAmount { field: AmountField, raw: String },

    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
}

/// A sale as entered on the sale form, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewSale {
    pub agent: String,
    pub upfront: Option<String>,
    pub monitoring: Option<String>,
    pub date: Option<String>,
}

impl NewSale {
    /// Validate the input and build a record stamped with `created_at`.
    ///
    /// Agent and date are required. Blank amounts count as zero.
    pub fn into_record(self, created_at: DateTime<Utc>) -> Result<SaleRecord, SaleInputError> {
        let agent = self.agent.trim().to_string();
        if agent.is_empty() {
            return Err(SaleInputError::MissingField("agent"));
        }

        let date_raw = self
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(SaleInputError::MissingField("date"))?;
        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
            .map_err(|_| SaleInputError::InvalidDate(date_raw.to_string()))?;

        let upfront = parse_entered_amount(AmountField::Upfront, self.upfront.as_deref())?;
        let monitoring = parse_entered_amount(AmountField::Monitoring, self.monitoring.as_deref())?;

        Ok(SaleRecord::new(agent, upfront, monitoring, date, created_at))
    }
}

fn parse_entered_amount(field: AmountField, raw: Option<&str>) -> Result<f64, SaleInputError> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(SaleInputError::InvalidAmount {
            field,
            raw: raw.to_string(),
        }),
    }
}
