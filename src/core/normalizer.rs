//! Turns a carrier rate reply into uniform, priced rate records.
//!
//! Carrier replies are loosely shaped: charges show up either as
//! `{amount, currency}` objects or as bare numbers, and either on the
//! rated shipment detail itself or inside its `shipmentRateDetail`.
//! Sub-entries whose charge cannot be resolved are dropped, never
//! reported as errors.

use crate::core::business_days::add_business_days;
use crate::core::geo::estimate_ground_days;
use crate::core::pricing::PricingPolicy;
use crate::domain::model::{
    CarrierAlert, DeliverySource, EstimatedDelivery, Money, NormalizedRateRecord, ShipmentRequest,
    TransitCommitments,
};
use crate::domain::ports::ZipLookup;
use crate::utils::error::{RateError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

pub const UNKNOWN_SERVICE: &str = "UNKNOWN";
pub const DEFAULT_CURRENCY: &str = "USD";

const GROUND_SERVICES: [&str; 2] = ["FEDEX_GROUND", "GROUND_HOME_DELIVERY"];

/// Services and alerts pulled out of a rate reply. Elements that do not
/// have the expected shape are skipped one at a time, so a single odd
/// entry never hides the rest of the reply.
#[derive(Debug, Default)]
pub struct RateReply {
    details: Vec<RateReplyDetail>,
    alerts: Vec<CarrierAlert>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateReplyDetail {
    #[serde(default, deserialize_with = "text_only")]
    pub service_type: Option<String>,
    #[serde(default, deserialize_with = "text_only")]
    pub service_name: Option<String>,
    #[serde(default, deserialize_with = "rated_details")]
    pub rated_shipment_details: Vec<RatedShipmentDetail>,
}

/// Left as raw JSON; `extract_net_charge` decides what is usable.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedShipmentDetail {
    #[serde(default, rename = "totalNetFedExCharge")]
    pub total_net_charge: Option<Value>,
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default)]
    pub shipment_rate_detail: Option<Value>,
}

fn text_only<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_str()
        .map(str::to_string))
}

fn rated_details<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<RatedShipmentDetail>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_list(Some(&value), "rated shipment detail"))
}

/// Array elements that deserialize into `T`; everything else is skipped.
fn lenient_list<T: DeserializeOwned>(value: Option<&Value>, what: &str) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!("Skipping {} #{}: {}", what, index, e);
                None
            }
        })
        .collect()
}

impl RateReply {
    pub fn from_value(raw: &Value) -> Result<Self> {
        if !raw.is_object() {
            return Err(RateError::malformed("rate reply is not a JSON object"));
        }
        let output = raw.get("output");
        Ok(Self {
            details: lenient_list(
                output.and_then(|o| o.get("rateReplyDetails")),
                "rate reply detail",
            ),
            alerts: lenient_list(output.and_then(|o| o.get("alerts")), "carrier alert"),
        })
    }

    pub fn details(&self) -> &[RateReplyDetail] {
        &self.details
    }

    pub fn alerts(&self) -> Vec<CarrierAlert> {
        self.alerts.clone()
    }
}

/// The two shapes a net charge arrives in.
#[derive(Debug, Clone, PartialEq)]
pub enum ChargeField {
    Structured {
        amount: Option<Decimal>,
        currency: Option<String>,
    },
    Scalar {
        amount: Decimal,
    },
}

impl ChargeField {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::Structured {
                amount: map.get("amount").and_then(parse_amount),
                currency: map.get("currency").and_then(Value::as_str).and_then(clean_currency),
            }),
            Value::Number(_) | Value::String(_) => {
                parse_amount(value).map(|amount| Self::Scalar { amount })
            }
            _ => None,
        }
    }

    /// Resolve to a priced amount. Scalars take the sibling `currency`
    /// field when the carrier sent one, else USD.
    pub fn resolve(self, sibling_currency: Option<&str>) -> Option<Money> {
        match self {
            Self::Structured {
                amount: Some(amount),
                currency: Some(currency),
            } => Some(Money::new(amount, currency)),
            Self::Structured { .. } => None,
            Self::Scalar { amount } => {
                let currency = sibling_currency
                    .and_then(clean_currency)
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
                Some(Money::new(amount, currency))
            }
        }
    }
}

fn clean_currency(currency: &str) -> Option<String> {
    let trimmed = currency.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_ascii_uppercase())
}

fn parse_amount(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn charge_from(value: Option<&Value>, sibling_currency: Option<&str>) -> Option<Money> {
    value
        .and_then(ChargeField::from_value)
        .and_then(|charge| charge.resolve(sibling_currency))
}

/// Net charge of one rated shipment detail: the top-level field wins,
/// the nested `shipmentRateDetail` is the fallback.
pub fn extract_net_charge(detail: &RatedShipmentDetail) -> Option<Money> {
    let sibling_currency = detail.currency.as_ref().and_then(Value::as_str);
    charge_from(detail.total_net_charge.as_ref(), sibling_currency).or_else(|| {
        let nested = detail.shipment_rate_detail.as_ref()?;
        charge_from(
            nested.get("totalNetFedExCharge"),
            nested.get("currency").and_then(Value::as_str),
        )
    })
}

pub fn is_ground_service(service_type: &str) -> bool {
    GROUND_SERVICES.contains(&service_type)
}

/// Fixed transit days for express services without a carrier commitment.
pub fn fixed_transit_days(service_type: &str) -> Option<u32> {
    match service_type {
        "FIRST_OVERNIGHT" | "PRIORITY_OVERNIGHT" | "STANDARD_OVERNIGHT" => Some(1),
        "FEDEX_2_DAY" | "FEDEX_2_DAY_AM" => Some(2),
        "FEDEX_EXPRESS_SAVER" => Some(3),
        _ => None,
    }
}

pub struct RateNormalizer<'a, Z: ZipLookup + ?Sized> {
    zips: &'a Z,
    pricing: PricingPolicy,
}

impl<'a, Z: ZipLookup + ?Sized> RateNormalizer<'a, Z> {
    pub fn new(zips: &'a Z, pricing: PricingPolicy) -> Self {
        Self { zips, pricing }
    }

    pub fn resolve_delivery(
        &self,
        service_type: &str,
        shipment: &ShipmentRequest,
        commitments: &TransitCommitments,
        ship_date: NaiveDate,
    ) -> (EstimatedDelivery, DeliverySource) {
        // 承運商承諾日期優先；Unavailable 則改用估算
        if let Some(EstimatedDelivery::Date(date)) = commitments.get(service_type) {
            return (EstimatedDelivery::Date(date), DeliverySource::CarrierCommitment);
        }

        if is_ground_service(service_type) {
            let days =
                estimate_ground_days(self.zips, shipment.origin_zip(), shipment.dest_zip());
            return (
                EstimatedDelivery::Date(add_business_days(ship_date, days)),
                DeliverySource::GroundDistance,
            );
        }

        match fixed_transit_days(service_type) {
            Some(days) => (
                EstimatedDelivery::Date(add_business_days(ship_date, days)),
                DeliverySource::ServiceTable,
            ),
            None => (EstimatedDelivery::Unavailable, DeliverySource::Unknown),
        }
    }

    /// One record per rated shipment detail with a resolvable charge, in
    /// reply order.
    pub fn normalize(
        &self,
        reply: &RateReply,
        shipment: &ShipmentRequest,
        commitments: &TransitCommitments,
        ship_date: NaiveDate,
    ) -> Vec<NormalizedRateRecord> {
        let mut records = Vec::new();

        for detail in reply.details() {
            let service_type = detail
                .service_type
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_SERVICE);
            let service_name = detail
                .service_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(service_type);

            let (estimated_delivery, delivery_source) =
                self.resolve_delivery(service_type, shipment, commitments, ship_date);

            for (index, rated_detail) in detail.rated_shipment_details.iter().enumerate() {
                let Some(list_price) = extract_net_charge(rated_detail) else {
                    tracing::debug!(
                        "Skipping {} rate detail #{}: no usable net charge",
                        service_type,
                        index
                    );
                    continue;
                };

                records.push(NormalizedRateRecord {
                    service_type: service_type.to_string(),
                    service_name: service_name.to_string(),
                    marked_up_price: self.pricing.price(&list_price),
                    list_price,
                    estimated_delivery,
                    delivery_source,
                });
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::reference::ZipDirectory;
    use crate::core::geo::EARTH_RADIUS_MILES;
    use crate::domain::model::{Dimensions, ZipLocation};
    use serde_json::json;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn ship_date() -> NaiveDate {
        // Monday
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn shipment() -> ShipmentRequest {
        ShipmentRequest::new("53202", "90210", 10.0, Dimensions::new(10.0, 10.0, 10.0)).unwrap()
    }

    /// Two ZIPs exactly 500 miles apart along a meridian.
    fn zips_500_miles() -> ZipDirectory {
        let lat = (500.0 / EARTH_RADIUS_MILES).to_degrees();
        ZipDirectory::from_locations(vec![
            ZipLocation {
                zip: "53202".to_string(),
                latitude: 0.0,
                longitude: 0.0,
                state_code: "WI".to_string(),
            },
            ZipLocation {
                zip: "90210".to_string(),
                latitude: lat,
                longitude: 0.0,
                state_code: "CA".to_string(),
            },
        ])
    }

    fn reply(raw: Value) -> RateReply {
        RateReply::from_value(&raw).unwrap()
    }

    #[test]
    fn test_charge_field_shapes() {
        assert_eq!(
            ChargeField::from_value(&json!({"amount": 45.0, "currency": "USD"})),
            Some(ChargeField::Structured {
                amount: Some(d("45.0")),
                currency: Some("USD".to_string())
            })
        );
        assert_eq!(
            ChargeField::from_value(&json!(12.5)),
            Some(ChargeField::Scalar { amount: d("12.5") })
        );
        assert_eq!(
            ChargeField::from_value(&json!("30.10")),
            Some(ChargeField::Scalar { amount: d("30.10") })
        );
        assert_eq!(ChargeField::from_value(&json!(true)), None);
        assert_eq!(ChargeField::from_value(&json!("n/a")), None);
    }

    #[test]
    fn test_scalar_defaults_to_usd() {
        let money = ChargeField::Scalar { amount: d("12.5") }.resolve(None).unwrap();
        assert_eq!(money, Money::new(d("12.5"), "USD"));

        let money = ChargeField::Scalar { amount: d("12.5") }
            .resolve(Some("cad"))
            .unwrap();
        assert_eq!(money.currency, "CAD");
    }

    #[test]
    fn test_structured_without_currency_is_dropped() {
        let charge = ChargeField::Structured {
            amount: Some(d("30")),
            currency: None,
        };
        assert_eq!(charge.resolve(Some("USD")), None);
    }

    #[test]
    fn test_top_level_charge_preferred_over_nested() {
        let detail: RatedShipmentDetail = serde_json::from_value(json!({
            "totalNetFedExCharge": 20.0,
            "shipmentRateDetail": {"totalNetFedExCharge": {"amount": 99.0, "currency": "USD"}}
        }))
        .unwrap();
        assert_eq!(extract_net_charge(&detail).unwrap().amount, d("20.0"));

        let nested_only: RatedShipmentDetail = serde_json::from_value(json!({
            "shipmentRateDetail": {"totalNetFedExCharge": {"amount": 99.0, "currency": "USD"}}
        }))
        .unwrap();
        assert_eq!(extract_net_charge(&nested_only).unwrap().amount, d("99.0"));

        let unusable_top: RatedShipmentDetail = serde_json::from_value(json!({
            "totalNetFedExCharge": {"amount": 5.0},
            "shipmentRateDetail": {"totalNetFedExCharge": 7.25}
        }))
        .unwrap();
        assert_eq!(extract_net_charge(&unusable_top).unwrap().amount, d("7.25"));
    }

    #[test]
    fn test_one_valid_one_missing_currency_yields_one_record() {
        let zips = zips_500_miles();
        let normalizer = RateNormalizer::new(&zips, PricingPolicy::default());
        let reply = reply(json!({
            "output": {"rateReplyDetails": [{
                "serviceType": "FEDEX_2_DAY",
                "serviceName": "FedEx 2Day",
                "ratedShipmentDetails": [
                    {"shipmentRateDetail": {"totalNetFedExCharge": {"amount": 30.0, "currency": "USD"}}},
                    {"shipmentRateDetail": {"totalNetFedExCharge": {"amount": 28.0}}}
                ]
            }]}
        }));

        let records =
            normalizer.normalize(&reply, &shipment(), &TransitCommitments::new(), ship_date());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].list_price.to_string(), "30.00 USD");
        assert_eq!(records[0].marked_up_price.to_string(), "33.00 USD");
    }

    #[test]
    fn test_ground_uses_distance_heuristic() {
        let zips = zips_500_miles();
        let normalizer = RateNormalizer::new(&zips, PricingPolicy::default());

        let (delivery, source) = normalizer.resolve_delivery(
            "FEDEX_GROUND",
            &shipment(),
            &TransitCommitments::new(),
            ship_date(),
        );

        assert_eq!(source, DeliverySource::GroundDistance);
        assert_eq!(
            delivery,
            EstimatedDelivery::Date(add_business_days(ship_date(), 3))
        );
    }

    #[test]
    fn test_commitment_wins_over_heuristics() {
        let zips = zips_500_miles();
        let normalizer = RateNormalizer::new(&zips, PricingPolicy::default());
        let committed = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        let commitments: TransitCommitments =
            [("FEDEX_GROUND".to_string(), EstimatedDelivery::Date(committed))]
                .into_iter()
                .collect();

        let (delivery, source) =
            normalizer.resolve_delivery("FEDEX_GROUND", &shipment(), &commitments, ship_date());

        assert_eq!(delivery, EstimatedDelivery::Date(committed));
        assert_eq!(source, DeliverySource::CarrierCommitment);
    }

    #[test]
    fn test_unavailable_commitment_falls_through() {
        let zips = ZipDirectory::default();
        let normalizer = RateNormalizer::new(&zips, PricingPolicy::default());
        let mut commitments = TransitCommitments::new();
        commitments.insert("PRIORITY_OVERNIGHT", EstimatedDelivery::Unavailable);

        let (delivery, source) = normalizer.resolve_delivery(
            "PRIORITY_OVERNIGHT",
            &shipment(),
            &commitments,
            ship_date(),
        );

        assert_eq!(source, DeliverySource::ServiceTable);
        assert_eq!(
            delivery,
            EstimatedDelivery::Date(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap())
        );
    }

    #[test]
    fn test_fixed_table_and_unknown_services() {
        assert_eq!(fixed_transit_days("STANDARD_OVERNIGHT"), Some(1));
        assert_eq!(fixed_transit_days("FEDEX_2_DAY_AM"), Some(2));
        assert_eq!(fixed_transit_days("FEDEX_EXPRESS_SAVER"), Some(3));
        assert_eq!(fixed_transit_days("INTERNATIONAL_PRIORITY"), None);

        let zips = ZipDirectory::default();
        let normalizer = RateNormalizer::new(&zips, PricingPolicy::default());
        let (delivery, source) = normalizer.resolve_delivery(
            "SMART_POST",
            &shipment(),
            &TransitCommitments::new(),
            ship_date(),
        );
        assert_eq!(delivery, EstimatedDelivery::Unavailable);
        assert_eq!(source, DeliverySource::Unknown);
    }

    #[test]
    fn test_missing_service_fields_fall_back() {
        let zips = ZipDirectory::default();
        let normalizer = RateNormalizer::new(&zips, PricingPolicy::default());
        let reply = reply(json!({
            "output": {"rateReplyDetails": [
                {"ratedShipmentDetails": [{"totalNetFedExCharge": 10}]},
                {"serviceType": "FEDEX_GROUND", "serviceName": null,
                 "ratedShipmentDetails": [{"totalNetFedExCharge": 11}]}
            ]}
        }));

        let records =
            normalizer.normalize(&reply, &shipment(), &TransitCommitments::new(), ship_date());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].service_type, UNKNOWN_SERVICE);
        assert_eq!(records[0].service_name, UNKNOWN_SERVICE);
        assert_eq!(records[0].estimated_delivery, EstimatedDelivery::Unavailable);
        assert_eq!(records[1].service_name, "FEDEX_GROUND");
        // unknown ZIPs -> worst-case five business days
        assert_eq!(
            records[1].estimated_delivery,
            EstimatedDelivery::Date(add_business_days(ship_date(), 5))
        );
    }

    #[test]
    fn test_every_surviving_sub_entry_is_marked_up() {
        let zips = ZipDirectory::default();
        let normalizer = RateNormalizer::new(&zips, PricingPolicy::default());
        let reply = reply(json!({
            "output": {"rateReplyDetails": [{
                "serviceType": "PRIORITY_OVERNIGHT",
                "serviceName": "FedEx Priority Overnight",
                "ratedShipmentDetails": [
                    {"rateType": "LIST", "totalNetFedExCharge": 80.0, "currency": "USD"},
                    {"rateType": "ACCOUNT", "totalNetFedExCharge": 60.0, "currency": "USD"}
                ]
            }]}
        }));

        let records =
            normalizer.normalize(&reply, &shipment(), &TransitCommitments::new(), ship_date());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].marked_up_price.amount, d("88.00"));
        assert_eq!(records[1].marked_up_price.amount, d("66.00"));
        assert_eq!(records[0].estimated_delivery, records[1].estimated_delivery);
        assert_eq!(records[0].service_name, records[1].service_name);
    }

    #[test]
    fn test_empty_and_malformed_replies() {
        assert!(reply(json!({})).details().is_empty());
        assert!(reply(json!({"output": {"alerts": []}})).alerts().is_empty());
        assert!(reply(json!({"output": {"rateReplyDetails": "nope"}})).details().is_empty());
        assert!(RateReply::from_value(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_alerts_are_collected() {
        let reply = reply(json!({
            "output": {"alerts": [{"code": "VIRTUAL.RESPONSE", "message": "This is a Virtual Response."}]}
        }));
        assert_eq!(
            reply.alerts(),
            vec![CarrierAlert {
                code: "VIRTUAL.RESPONSE".to_string(),
                message: "This is a Virtual Response.".to_string()
            }]
        );
    }

    #[test]
    fn test_odd_fields_do_not_hide_good_rates() {
        let zips = zips_500_miles();
        let normalizer = RateNormalizer::new(&zips, PricingPolicy::default());
        let reply = reply(json!({
            "output": {
                "rateReplyDetails": [
                    {"serviceType": "FEDEX_GROUND", "serviceName": "FedEx Ground",
                     "ratedShipmentDetails": [{"totalNetFedExCharge": 21.5, "currency": "USD"}]},
                    {"serviceType": "FEDEX_2_DAY", "serviceName": "FedEx 2Day",
                     "ratedShipmentDetails": [
                         {"totalNetFedExCharge": 30.0, "currency": 840},
                         {"shipmentRateDetail": "n/a"},
                         "garbage"
                     ]},
                    {"serviceType": 7, "serviceName": ["x"], "ratedShipmentDetails": {"a": 1}},
                    42
                ],
                "alerts": [
                    {"code": null, "message": "Null code"},
                    "not an alert"
                ]
            }
        }));

        let records =
            normalizer.normalize(&reply, &shipment(), &TransitCommitments::new(), ship_date());

        assert_eq!(reply.details().len(), 3);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].service_name, "FedEx Ground");
        assert_eq!(records[0].marked_up_price.to_string(), "23.65 USD");
        // numeric currency is ignored, scalar falls back to USD
        assert_eq!(records[1].service_name, "FedEx 2Day");
        assert_eq!(records[1].list_price.to_string(), "30.00 USD");

        assert_eq!(
            reply.alerts(),
            vec![CarrierAlert {
                code: String::new(),
                message: "Null code".to_string()
            }]
        );
    }
}
