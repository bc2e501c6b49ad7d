pub mod errors;
pub mod hyperliquid;

use async_trait::async_trait;

pub use errors::PriceSourceError;
pub use hyperliquid::HyperliquidClient;

/// Anything that can quote a current price for an asset identifier.
///
/// Implementations must only return finite, strictly positive prices; everything
/// else is reported as an error so the caller can skip the cycle.
#[async_trait]
pub trait PriceSource: Send + Sync + 'static {
    async fn fetch_price(&self, asset: &str) -> Result<f64, PriceSourceError>;
}
