// FedEx REST API: OAuth, rate quotes, transit times.

pub mod auth;
pub mod client;
pub mod rate_request;
pub mod transit;

pub use client::FedexClient;
