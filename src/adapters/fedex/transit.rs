use crate::adapters::fedex::rate_request::{AccountNumber, Address, Party, PICKUP_DROPOFF};
use crate::domain::model::{AccessToken, EstimatedDelivery, ShipmentRequest, TransitCommitments};
use crate::utils::error::{RateError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const TRANSIT_PATH: &str = "/availability/v1/transittimes";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransitShipment {
    pub shipper: Party,
    pub recipient: Party,
    pub pickup_type: &'static str,
    pub ship_date: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransitTimeRequest {
    pub account_number: AccountNumber,
    pub requested_shipment: TransitShipment,
}

#[derive(Debug, Default, Deserialize)]
struct TransitReply {
    #[serde(default)]
    output: Option<TransitOutput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransitOutput {
    #[serde(default)]
    transit_time_details: Option<Vec<TransitTimeDetail>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransitTimeDetail {
    #[serde(default)]
    service_type: Option<String>,
    #[serde(default)]
    commit_date: Option<String>,
    #[serde(default)]
    commit: Option<CommitDetail>,
}

// 正式 API 把日期放在 commit.dateDetail.dayFormat
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitDetail {
    #[serde(default)]
    date_detail: Option<DateDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateDetail {
    #[serde(default)]
    day_format: Option<String>,
}

pub fn build_transit_request(
    shipment: &ShipmentRequest,
    account_number: &str,
    ship_date: NaiveDate,
) -> TransitTimeRequest {
    TransitTimeRequest {
        account_number: AccountNumber {
            value: account_number.to_string(),
        },
        requested_shipment: TransitShipment {
            shipper: Party {
                address: Address::us(shipment.origin_zip(), shipment.origin_state()),
            },
            recipient: Party {
                address: Address::us(shipment.dest_zip(), shipment.dest_state()),
            },
            pickup_type: PICKUP_DROPOFF,
            ship_date: ship_date.format("%Y-%m-%d").to_string(),
        },
    }
}

/// Reads the leading `YYYY-MM-DD` of a carrier timestamp.
pub fn parse_commit_date(raw: Option<&str>) -> EstimatedDelivery {
    raw.map(str::trim)
        .and_then(|s| s.get(..10))
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .map(EstimatedDelivery::Date)
        .unwrap_or(EstimatedDelivery::Unavailable)
}

pub fn parse_transit_reply(raw: &serde_json::Value) -> Result<TransitCommitments> {
    let reply: TransitReply = serde_json::from_value(raw.clone())
        .map_err(|e| RateError::transit_lookup(format!("unreadable transit reply: {}", e)))?;

    let details = reply
        .output
        .and_then(|o| o.transit_time_details)
        .unwrap_or_default();

    Ok(details
        .into_iter()
        .filter_map(|detail| {
            let service_type = detail.service_type.filter(|s| !s.trim().is_empty())?;
            let raw_date = detail.commit_date.or_else(|| {
                detail
                    .commit
                    .and_then(|c| c.date_detail)
                    .and_then(|d| d.day_format)
            });
            Some((service_type, parse_commit_date(raw_date.as_deref())))
        })
        .collect())
}

async fn try_fetch(
    http: &Client,
    transit_url: &str,
    token: &AccessToken,
    request: &TransitTimeRequest,
) -> Result<TransitCommitments> {
    let response = http
        .post(transit_url)
        .bearer_auth(token.as_str())
        .json(request)
        .send()
        .await
        .map_err(|e| RateError::transit_lookup(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RateError::transit_lookup(format!("HTTP {}", status)));
    }

    let raw: serde_json::Value = response
        .json()
        .await
        .map_err(|e| RateError::transit_lookup(e.to_string()))?;
    parse_transit_reply(&raw)
}

/// Committed delivery dates per service. Failures are logged and yield
/// empty commitments so rates still display.
pub async fn fetch_transit_times(
    http: &Client,
    transit_url: &str,
    token: &AccessToken,
    request: &TransitTimeRequest,
) -> TransitCommitments {
    match try_fetch(http, transit_url, token, request).await {
        Ok(commitments) => commitments,
        Err(e) => {
            tracing::warn!("⚠️  {}; falling back to estimated delivery dates", e);
            TransitCommitments::new()
        }
    }
}
