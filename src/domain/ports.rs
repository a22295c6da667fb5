use crate::domain::model::{
    AccessToken, Product, ShipmentRequest, TransitCommitments, ZipLocation,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Read-only ZIP reference data.
pub trait ZipLookup: Send + Sync {
    fn locate(&self, zip: &str) -> Result<&ZipLocation>;
}

/// Read-only product catalog.
pub trait ProductLookup: Send + Sync {
    fn product(&self, product_number: &str) -> Result<&Product>;
}

/// Supplier ship-from locations.
pub trait SupplierLookup: Send + Sync {
    fn supplier_zip(&self, supplier_code: &str) -> Result<&str>;
}

#[async_trait]
pub trait CarrierApi: Send + Sync {
    /// Exchange the configured client credentials for a bearer token.
    async fn authenticate(&self) -> Result<AccessToken>;

    /// Request list rates and return the raw carrier reply.
    async fn request_rates(
        &self,
        token: &AccessToken,
        shipment: &ShipmentRequest,
        ship_date: NaiveDate,
    ) -> Result<serde_json::Value>;

    /// Committed delivery dates per service. Never fails; an unreachable
    /// or malformed transit endpoint yields empty commitments.
    async fn transit_times(
        &self,
        token: &AccessToken,
        shipment: &ShipmentRequest,
        ship_date: NaiveDate,
    ) -> TransitCommitments;
}
