pub mod client;
pub mod types;

pub use client::HyperliquidClient;
pub use types::*;
