use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::types::{InfoRequest, L2Book, Meta};
use crate::source::{PriceSource, PriceSourceError};

pub const DEFAULT_API_URL: &str = "https://api.hyperliquid.xyz";

/// Thin client over Hyperliquid's `/info` endpoint.
#[derive(Clone)]
pub struct HyperliquidClient {
    http: Client,
    url: String,
}

impl HyperliquidClient {
    pub fn new(url: impl Into<String>) -> Result<Self, PriceSourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .user_agent(concat!("pricewatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            url: url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn info<T: DeserializeOwned>(&self, body: &InfoRequest<'_>) -> Result<T, PriceSourceError> {
        let url = format!("{}/info", self.url);

        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }

    #[instrument(skip(self), fields(asset = %asset), level = "debug")]
    pub async fn fetch_book(&self, asset: &str) -> Result<L2Book, PriceSourceError> {
        let book: L2Book = self.info(&InfoRequest::L2Book { coin: asset }).await?;

        debug!(
            bids = book.levels.first().map(Vec::len).unwrap_or_default(),
            asks = book.levels.get(1).map(Vec::len).unwrap_or_default(),
            "hyperliquid book fetched"
        );

        Ok(book)
    }

    /// Whether `asset` appears in the exchange universe.
    #[instrument(skip(self), fields(asset = %asset), level = "debug")]
    pub async fn is_listed(&self, asset: &str) -> Result<bool, PriceSourceError> {
        let meta: Meta = self.info(&InfoRequest::Meta).await?;
        Ok(meta.lists(asset))
    }
}

#[async_trait]
impl PriceSource for HyperliquidClient {
    async fn fetch_price(&self, asset: &str) -> Result<f64, PriceSourceError> {
        let book = self.fetch_book(asset).await?;
        if book.levels.iter().all(Vec::is_empty) {
            return Err(PriceSourceError::UnknownAsset(asset.to_string()));
        }
        book.mid_price()
    }
}
