use crate::adapters::fedex::auth::{request_token, TOKEN_PATH};
use crate::adapters::fedex::rate_request::{build_rate_request, send_rate_request, RATE_PATH};
use crate::adapters::fedex::transit::{build_transit_request, fetch_transit_times, TRANSIT_PATH};
use crate::config::toml_config::CarrierConfig;
use crate::domain::model::{AccessToken, ShipmentRequest, TransitCommitments};
use crate::domain::ports::CarrierApi;
use crate::utils::error::{RateError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("rate-checker/", env!("CARGO_PKG_VERSION"));

/// FedEx REST client. Holds one pooled HTTP client with a bounded
/// request timeout; tokens are not cached between rate checks.
pub struct FedexClient {
    http: Client,
    config: CarrierConfig,
}

impl FedexClient {
    pub fn new(config: CarrierConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { http, config })
    }

    fn account_number(&self) -> &str {
        self.config.account_number().unwrap_or_default()
    }
}

#[async_trait]
impl CarrierApi for FedexClient {
    async fn authenticate(&self) -> Result<AccessToken> {
        let (Some(client_id), Some(client_secret)) =
            (self.config.client_id(), self.config.client_secret())
        else {
            return Err(RateError::auth("client credentials are not configured"));
        };

        request_token(
            &self.http,
            &self.config.endpoint(TOKEN_PATH),
            client_id,
            client_secret,
        )
        .await
    }

    async fn request_rates(
        &self,
        token: &AccessToken,
        shipment: &ShipmentRequest,
        ship_date: NaiveDate,
    ) -> Result<serde_json::Value> {
        if self.config.account_number().is_none() {
            tracing::warn!("No account number configured; the carrier will likely reject the quote");
        }

        let request = build_rate_request(
            shipment,
            self.account_number(),
            ship_date,
            &self.config.packaging_type,
        );
        send_rate_request(&self.http, &self.config.endpoint(RATE_PATH), token, &request).await
    }

    async fn transit_times(
        &self,
        token: &AccessToken,
        shipment: &ShipmentRequest,
        ship_date: NaiveDate,
    ) -> TransitCommitments {
        let request = build_transit_request(shipment, self.account_number(), ship_date);
        fetch_transit_times(
            &self.http,
            &self.config.endpoint(TRANSIT_PATH),
            token,
            &request,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Dimensions;
    use httpmock::prelude::*;

    fn config(base_url: String) -> CarrierConfig {
        CarrierConfig {
            base_url,
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            account_number: Some("42".to_string()),
            ..CarrierConfig::default()
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_without_network() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST).path(TOKEN_PATH);
            then.status(200)
                .json_body(serde_json::json!({"access_token": "x"}));
        });

        let mut cfg = config(server.base_url());
        cfg.client_secret = Some("${FEDEX_CLIENT_SECRET}".to_string());
        let client = FedexClient::new(cfg).unwrap();

        let result = client.authenticate().await;
        assert!(matches!(result, Err(RateError::Auth { .. })));
        token_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_rate_request_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(RATE_PATH);
            then.status(200)
                .delay(Duration::from_millis(2500))
                .json_body(serde_json::json!({}));
        });

        let mut cfg = config(server.base_url());
        cfg.timeout_seconds = 1;
        let client = FedexClient::new(cfg).unwrap();
        let shipment =
            ShipmentRequest::new("53202", "90210", 1.0, Dimensions::new(1.0, 1.0, 1.0)).unwrap();

        let result = client
            .request_rates(
                &AccessToken::new("t"),
                &shipment,
                NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            )
            .await;

        assert!(matches!(result, Err(RateError::RateRequest { .. })));
    }
}
