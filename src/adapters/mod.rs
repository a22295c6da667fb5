// Adapters layer: concrete implementations for external systems (carrier API, reference data).

pub mod fedex;
pub mod reference;
