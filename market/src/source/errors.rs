use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceSourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("order book for {0} has no bid or no ask")]
    EmptyBook(String),

    #[error("asset {0} is not listed")]
    UnknownAsset(String),

    #[error("invalid price {0}")]
    InvalidPrice(f64),

    #[error("numeric parse error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}
