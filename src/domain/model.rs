use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_measure, validate_zip};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Canonical 5-digit form of a US postal code.
///
/// ZIP+4 suffixes are dropped and numeric codes that lost their leading
/// zeros in a spreadsheet export ("2134") are padded back ("02134").
pub fn normalize_zip(zip: &str) -> String {
    let base = zip.trim().split('-').next().unwrap_or("").trim();
    if !base.is_empty() && base.len() < 5 && base.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>5}", base)
    } else {
        base.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_in: f64,
    pub width_in: f64,
    pub height_in: f64,
}

impl Dimensions {
    pub fn new(length_in: f64, width_in: f64, height_in: f64) -> Self {
        Self {
            length_in,
            width_in,
            height_in,
        }
    }
}

/// A validated shipment. Fields are private so a request cannot change
/// after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRequest {
    origin_zip: String,
    origin_state: Option<String>,
    dest_zip: String,
    dest_state: Option<String>,
    weight_lb: f64,
    dimensions: Dimensions,
}

impl ShipmentRequest {
    pub fn new(
        origin_zip: &str,
        dest_zip: &str,
        weight_lb: f64,
        dimensions: Dimensions,
    ) -> Result<Self> {
        validate_zip("origin_zip", origin_zip)?;
        validate_zip("dest_zip", dest_zip)?;
        validate_positive_measure("weight_lb", weight_lb)?;
        validate_positive_measure("length_in", dimensions.length_in)?;
        validate_positive_measure("width_in", dimensions.width_in)?;
        validate_positive_measure("height_in", dimensions.height_in)?;

        Ok(Self {
            origin_zip: normalize_zip(origin_zip),
            origin_state: None,
            dest_zip: normalize_zip(dest_zip),
            dest_state: None,
            weight_lb,
            dimensions,
        })
    }

    /// Build a shipment from a catalog product shipping from `origin_zip`.
    pub fn from_product(product: &Product, origin_zip: &str, dest_zip: &str) -> Result<Self> {
        Self::new(
            origin_zip,
            dest_zip,
            product.weight,
            Dimensions::new(product.length, product.width, product.height),
        )
    }

    pub fn with_states(mut self, origin_state: Option<String>, dest_state: Option<String>) -> Self {
        self.origin_state = clean_state(origin_state);
        self.dest_state = clean_state(dest_state);
        self
    }

    pub fn origin_zip(&self) -> &str {
        &self.origin_zip
    }

    pub fn origin_state(&self) -> Option<&str> {
        self.origin_state.as_deref()
    }

    pub fn dest_zip(&self) -> &str {
        &self.dest_zip
    }

    pub fn dest_state(&self) -> Option<&str> {
        self.dest_state.as_deref()
    }

    pub fn weight_lb(&self) -> f64 {
        self.weight_lb
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}

fn clean_state(state: Option<String>) -> Option<String> {
    state
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_number: String,
    pub supplier_code: String,
    #[serde(default)]
    pub zip: String,
    pub weight: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub supplier_code: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipLocation {
    pub zip: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
    #[serde(alias = "state")]
    pub state_code: String,
}

/// Short-lived bearer token. Debug output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        write!(f, "{} {}", amount, self.currency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatedDelivery {
    Date(NaiveDate),
    Unavailable,
}

impl EstimatedDelivery {
    pub const UNAVAILABLE_LABEL: &'static str = "Estimate unavailable";
}

impl fmt::Display for EstimatedDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Unavailable => f.write_str(Self::UNAVAILABLE_LABEL),
        }
    }
}

impl Serialize for EstimatedDelivery {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Where an estimated delivery date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverySource {
    CarrierCommitment,
    GroundDistance,
    ServiceTable,
    Unknown,
}

/// Carrier-committed delivery dates keyed by service type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitCommitments {
    by_service: HashMap<String, EstimatedDelivery>,
}

impl TransitCommitments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service_type: impl Into<String>, commit: EstimatedDelivery) {
        self.by_service.insert(service_type.into(), commit);
    }

    pub fn get(&self, service_type: &str) -> Option<EstimatedDelivery> {
        self.by_service.get(service_type).copied()
    }

    pub fn len(&self) -> usize {
        self.by_service.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_service.is_empty()
    }
}

impl FromIterator<(String, EstimatedDelivery)> for TransitCommitments {
    fn from_iter<I: IntoIterator<Item = (String, EstimatedDelivery)>>(iter: I) -> Self {
        Self {
            by_service: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierAlert {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub message: String,
}

/// Null becomes empty and numbers keep their text.
fn text_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRateRecord {
    pub service_type: String,
    pub service_name: String,
    pub list_price: Money,
    pub marked_up_price: Money,
    pub estimated_delivery: EstimatedDelivery,
    pub delivery_source: DeliverySource,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateCheckOutcome {
    pub records: Vec<NormalizedRateRecord>,
    pub alerts: Vec<CarrierAlert>,
    pub raw_response: serde_json::Value,
}

impl RateCheckOutcome {
    pub fn has_rates(&self) -> bool {
        !self.records.is_empty()
    }
}
