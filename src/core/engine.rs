use crate::core::normalizer::{RateNormalizer, RateReply};
use crate::core::presentation::{sort_by_price, NO_RATES_MESSAGE};
use crate::core::pricing::PricingPolicy;
use crate::domain::model::{RateCheckOutcome, ShipmentRequest, TransitCommitments};
use crate::domain::ports::{CarrierApi, ZipLookup};
use crate::utils::error::Result;
use chrono::NaiveDate;

/// Runs one rate check: auth, rates, transit times, normalization and
/// sorting, strictly in that order. A fresh token is fetched per run.
pub struct RateCheckEngine<C: CarrierApi, Z: ZipLookup> {
    carrier: C,
    zips: Z,
    pricing: PricingPolicy,
}

impl<C: CarrierApi, Z: ZipLookup> RateCheckEngine<C, Z> {
    pub fn new(carrier: C, zips: Z, pricing: PricingPolicy) -> Self {
        Self {
            carrier,
            zips,
            pricing,
        }
    }

    pub async fn run(
        &self,
        shipment: &ShipmentRequest,
        ship_date: NaiveDate,
    ) -> Result<RateCheckOutcome> {
        tracing::info!(
            "Checking rates {} -> {} ({} lb, ship date {})",
            shipment.origin_zip(),
            shipment.dest_zip(),
            shipment.weight_lb(),
            ship_date
        );

        // 認證失敗直接中止，不發出報價請求
        let token = self.carrier.authenticate().await?;
        tracing::debug!("Access token acquired");

        let raw_response = self
            .carrier
            .request_rates(&token, shipment, ship_date)
            .await?;
        let reply = RateReply::from_value(&raw_response)?;
        tracing::debug!("Carrier returned {} service entries", reply.details().len());

        let commitments = if reply.details().is_empty() {
            TransitCommitments::new()
        } else {
            self.carrier
                .transit_times(&token, shipment, ship_date)
                .await
        };
        tracing::debug!("{} transit commitments", commitments.len());

        let normalizer = RateNormalizer::new(&self.zips, self.pricing);
        let mut records = normalizer.normalize(&reply, shipment, &commitments, ship_date);
        sort_by_price(&mut records);

        if records.is_empty() {
            tracing::warn!("{}", NO_RATES_MESSAGE);
        } else {
            tracing::info!("✅ {} rate options priced", records.len());
        }

        Ok(RateCheckOutcome {
            records,
            alerts: reply.alerts(),
            raw_response,
        })
    }
}
