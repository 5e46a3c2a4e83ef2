//! HTTP gateway client for a remote inventory service.

use std::time::Duration;

use async_trait::async_trait;
use common::ProductId;
use domain::Money;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{GatewayError, InventoryGateway, ProductInfo};

/// Wire shape of a product on the inventory surface.
#[derive(Debug, Serialize, Deserialize)]
struct ProductDto {
    name: String,
    unit_price_cents: i64,
    is_active: bool,
}

#[derive(Debug, Serialize)]
struct QuantityBody {
    quantity: u32,
}

/// Gateway client over HTTP (reqwest).
///
/// Calls are synchronous from the saga's point of view: one attempt, a
/// per-request timeout, no retry or backoff. `404` maps to `NotFound`,
/// `409` to `Conflict`, everything else (including transport errors) to
/// `Unavailable`.
#[derive(Debug, Clone)]
pub struct HttpInventoryGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInventoryGateway {
    /// Default per-request deadline.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a gateway client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a gateway client with a custom per-request deadline.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn product_url(&self, product_id: &ProductId, suffix: &str) -> String {
        format!("{}/products/{}{}", self.base_url, product_id, suffix)
    }

    async fn post_quantity(
        &self,
        product_id: &ProductId,
        suffix: &str,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        let url = self.product_url(product_id, suffix);
        let response = self
            .client
            .post(&url)
            .json(&QuantityBody { quantity })
            .send()
            .await
            .map_err(|err| transport_error(&url, err))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(product_id.clone())),
            StatusCode::CONFLICT => {
                let detail = response.text().await.unwrap_or_default();
                Err(GatewayError::Conflict {
                    product_id: product_id.clone(),
                    detail,
                })
            }
            status => Err(GatewayError::Unavailable(format!(
                "{url} returned {status}"
            ))),
        }
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> GatewayError {
    tracing::warn!(url, error = %err, "inventory call failed");
    GatewayError::Unavailable(err.to_string())
}

#[async_trait]
impl InventoryGateway for HttpInventoryGateway {
    async fn fetch_product(&self, product_id: &ProductId) -> Result<ProductInfo, GatewayError> {
        let url = self.product_url(product_id, "");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| transport_error(&url, err))?;

        match response.status() {
            status if status.is_success() => {
                let dto: ProductDto = response
                    .json()
                    .await
                    .map_err(|err| transport_error(&url, err))?;
                Ok(ProductInfo {
                    name: dto.name,
                    unit_price: Money::from_cents(dto.unit_price_cents),
                    is_active: dto.is_active,
                })
            }
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(product_id.clone())),
            status => Err(GatewayError::Unavailable(format!(
                "{url} returned {status}"
            ))),
        }
    }

    async fn reserve_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        self.post_quantity(product_id, "/reserve", quantity).await
    }

    async fn release_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        self.post_quantity(product_id, "/release", quantity).await
    }
}
