pub mod business_days;
pub mod engine;
pub mod geo;
pub mod normalizer;
pub mod presentation;
pub mod pricing;
pub mod shipment;

pub use crate::domain::model::{NormalizedRateRecord, RateCheckOutcome, ShipmentRequest};
pub use crate::domain::ports::{CarrierApi, ProductLookup, SupplierLookup, ZipLookup};
pub use crate::utils::error::Result;
