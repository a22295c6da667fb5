use crate::domain::model::{AccessToken, ShipmentRequest};
use crate::utils::error::{RateError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;

pub const RATE_PATH: &str = "/rate/v1/rates/quotes";
pub const COUNTRY_US: &str = "US";
pub const PICKUP_DROPOFF: &str = "DROPOFF_AT_FEDEX_LOCATION";
pub const DEFAULT_PACKAGING: &str = "YOUR_PACKAGING";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccountNumber {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_or_province_code: Option<String>,
    pub country_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residential: Option<bool>,
}

impl Address {
    pub fn us(postal_code: &str, state: Option<&str>) -> Self {
        Self {
            postal_code: postal_code.to_string(),
            state_or_province_code: state.map(str::to_string),
            country_code: COUNTRY_US,
            residential: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Party {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Weight {
    pub units: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PackageDimensions {
    pub length: u32,
    pub width: u32,
    pub height: u32,
    pub units: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PackageLineItem {
    pub weight: Weight,
    pub dimensions: PackageDimensions,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestedShipment {
    pub shipper: Party,
    pub recipient: Party,
    pub ship_date_stamp: String,
    pub pickup_type: &'static str,
    pub packaging_type: String,
    pub rate_request_type: Vec<&'static str>,
    pub requested_package_line_items: Vec<PackageLineItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateQuoteRequest {
    pub account_number: AccountNumber,
    pub requested_shipment: RequestedShipment,
}

// 整數英吋，小數直接截斷
fn whole_inches(value: f64) -> u32 {
    value.trunc() as u32
}

/// Rate quote payload for one package at retail (LIST) rates.
pub fn build_rate_request(
    shipment: &ShipmentRequest,
    account_number: &str,
    ship_date: NaiveDate,
    packaging_type: &str,
) -> RateQuoteRequest {
    let dims = shipment.dimensions();
    let mut recipient = Address::us(shipment.dest_zip(), shipment.dest_state());
    recipient.residential = Some(false);

    RateQuoteRequest {
        account_number: AccountNumber {
            value: account_number.to_string(),
        },
        requested_shipment: RequestedShipment {
            shipper: Party {
                address: Address::us(shipment.origin_zip(), shipment.origin_state()),
            },
            recipient: Party { address: recipient },
            ship_date_stamp: ship_date.format("%Y-%m-%d").to_string(),
            pickup_type: PICKUP_DROPOFF,
            packaging_type: packaging_type.to_string(),
            rate_request_type: vec!["LIST"],
            requested_package_line_items: vec![PackageLineItem {
                weight: Weight {
                    units: "LB",
                    value: shipment.weight_lb(),
                },
                dimensions: PackageDimensions {
                    length: whole_inches(dims.length_in),
                    width: whole_inches(dims.width_in),
                    height: whole_inches(dims.height_in),
                    units: "IN",
                },
            }],
        },
    }
}

/// POST the quote request. Transport errors and non-2xx statuses are
/// [`RateError::RateRequest`] carrying the underlying error text.
pub async fn send_rate_request(
    http: &Client,
    rate_url: &str,
    token: &AccessToken,
    request: &RateQuoteRequest,
) -> Result<serde_json::Value> {
    tracing::debug!("POST {}", rate_url);
    let response = http
        .post(rate_url)
        .bearer_auth(token.as_str())
        .json(request)
        .send()
        .await
        .map_err(|e| RateError::rate_request(e.to_string()))?;

    let status = response.status();
    tracing::debug!("Rate API response status: {}", status);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail: String = body.chars().take(500).collect();
        return Err(RateError::rate_request(format!("HTTP {}: {}", status, detail)));
    }

    response
        .json()
        .await
        .map_err(|e| RateError::rate_request(format!("unreadable rate response: {}", e)))
}
