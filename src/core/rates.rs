//! Exchange rate abstractions

use super::error::{ConvertError, ConvertResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Rates relative to USD, keyed by lowercase currency code.
///
/// Entries are kept as raw JSON and only inspected when a currency is asked for,
/// so a malformed entry for an unrelated currency does not affect conversions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    entries: HashMap<String, Value>,
}

impl RateTable {
    pub fn new(entries: HashMap<String, Value>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(code, entry)| (code.to_lowercase(), entry))
            .collect();
        RateTable { entries }
    }

    /// Parses the body of a rate document. The top level must be a JSON object.
    pub fn from_json(text: &str) -> ConvertResult<Self> {
        let entries: HashMap<String, Value> = serde_json::from_str(text)
            .map_err(|e| ConvertError::UpstreamData(format!("Failed to parse rate document: {e}")))?;
        Ok(RateTable::new(entries))
    }

    /// Returns the numeric `rate` field of the entry for `code` (any case).
    pub fn rate_for(&self, code: &str) -> ConvertResult<f64> {
        let key = code.to_lowercase();
        let entry = self
            .entries
            .get(&key)
            .ok_or_else(|| ConvertError::UpstreamData(format!("No rate entry for '{key}'")))?;
        // Covers a missing field, a non-numeric field and an entry that is not an object
        entry.get("rate").and_then(Value::as_f64).ok_or_else(|| {
            ConvertError::UpstreamData(format!("Rate entry for '{key}' has no numeric rate field"))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        RateTable::new(
            iter.into_iter()
                .map(|(code, rate)| (code.into(), json!({ "rate": rate })))
                .collect(),
        )
    }
}

/// A remote source of the current USD rate table.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self) -> ConvertResult<RateTable>;
}
