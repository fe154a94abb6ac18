use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::core::error::ExtractionError;

/// One weighment event from the transaction log.
///
/// Descriptive fields are kept verbatim; sanitizing happens when the
/// output filename is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "Transaction DateTime", default, deserialize_with = "text_field")]
    pub datetime: String,
    #[serde(rename = "Vehicle Type", default, deserialize_with = "text_field")]
    pub vehicle_type: String,
    #[serde(rename = "Weighment Type", default, deserialize_with = "text_field")]
    pub weighment_type: String,
    #[serde(rename = "Weight", default, deserialize_with = "text_field")]
    pub weight: String,
    #[serde(rename = "Material", default, deserialize_with = "text_field")]
    pub material: String,
}

/// Accept strings as-is and render numbers/bools in their JSON form (`12.5`, `true`); null is empty.
fn text_field<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

impl TransactionRecord {
    /// Parse the weighbridge timestamp with `format`.
    pub fn timestamp(&self, format: &str) -> Result<NaiveDateTime, ExtractionError> {
        NaiveDateTime::parse_from_str(self.datetime.trim(), format).map_err(|e| {
            ExtractionError::InvalidTransactionTime {
                value: self.datetime.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Shift a weighbridge timestamp onto the recorder clock.
pub fn correct_timestamp(raw: NaiveDateTime, offset_secs: i64) -> Result<NaiveDateTime, ExtractionError> {
    Duration::try_seconds(offset_secs)
        .and_then(|offset| raw.checked_sub_signed(offset))
        .ok_or(ExtractionError::OffsetOutOfRange { raw, offset_secs })
}

/// Read the whole transaction log. Any failure here ends the run.
pub fn load_transactions(path: &Path) -> Result<Vec<TransactionRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read transactions file: {}", path.display()))?;
    parse_transactions(&content)
        .with_context(|| format!("Failed to parse transactions file: {}", path.display()))
}

pub fn parse_transactions(content: &str) -> Result<Vec<TransactionRecord>> {
    let records: Vec<TransactionRecord> = serde_json::from_str(content)?;
    Ok(records)
}
