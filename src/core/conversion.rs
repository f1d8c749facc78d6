//! USD amount parsing and conversion into the target currencies

use super::error::{ConvertError, ConvertResult};
use super::rates::RateTable;
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const BASE_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRequest {
    pub usd_amount: f64,
}

impl ConversionRequest {
    /// Parses the raw `usd_amount` query parameter.
    ///
    /// Any finite decimal numeral is accepted, including zero and negatives.
    pub fn parse(raw: Option<&str>) -> ConvertResult<Self> {
        let raw = raw.ok_or_else(|| ConvertError::Input("missing usd_amount parameter".into()))?;
        // Query strings often carry stray spaces, e.g. `usd_amount=%20100`
        let trimmed = raw.trim();
        let usd_amount: f64 = trimmed
            .parse()
            .map_err(|_| ConvertError::Input(format!("'{raw}' is not a number")))?;
        if !usd_amount.is_finite() {
            return Err(ConvertError::Input(format!("'{raw}' is not a finite number")));
        }
        Ok(ConversionRequest { usd_amount })
    }
}

/// Converted amounts in response order: USD first, then the targets as configured.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    amounts: Vec<(String, f64)>,
}

impl ConversionResult {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.amounts
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.amounts.iter().map(|(c, a)| (c.as_str(), *a))
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

impl Serialize for ConversionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.amounts.len()))?;
        for (code, amount) in &self.amounts {
            map.serialize_entry(code, amount)?;
        }
        map.end()
    }
}

/// Converts `request` into every target currency, or fails as a whole.
pub fn convert(
    request: &ConversionRequest,
    rates: &RateTable,
    targets: &[String],
) -> ConvertResult<ConversionResult> {
    let amount = request.usd_amount;
    let mut amounts = Vec::with_capacity(targets.len() + 1);
    amounts.push((BASE_CURRENCY.to_string(), amount));
    // Any missing rate aborts the whole conversion, no partial results
    for code in targets {
        let code = code.to_uppercase();
        let rate = rates.rate_for(&code)?;
        let converted = rate * amount;
        // A finite amount can still overflow once scaled, and JSON has no infinity
        if !converted.is_finite() {
            return Err(ConvertError::Input(format!(
                "{amount} USD is too large to express in {code}"
            )));
        }
        amounts.push((code, converted));
    }
    Ok(ConversionResult { amounts })
}
