pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::fedex::FedexClient;
pub use adapters::reference::{ProductCatalog, SupplierDirectory, ZipDirectory};
pub use config::RateConfig;
pub use crate::core::{engine::RateCheckEngine, pricing::PricingPolicy};
pub use utils::error::{RateError, Result};
