use serde::{Deserialize, Serialize};

use crate::source::PriceSourceError;

/// Body of a `POST /info` request.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InfoRequest<'a> {
    Meta,
    L2Book { coin: &'a str },
}

/// One price level. Hyperliquid encodes decimals as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct BookLevel {
    pub px: String,
    pub sz: String,
    pub n: u32,
}

/// Response to `{"type":"l2Book"}`: `levels[0]` are bids (best first),
/// `levels[1]` are asks (best first).
#[derive(Debug, Clone, Deserialize)]
pub struct L2Book {
    pub coin: String,
    pub time: u64,
    pub levels: Vec<Vec<BookLevel>>,
}

impl L2Book {
    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.levels.first().and_then(|side| side.first())
    }

    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.levels.get(1).and_then(|side| side.first())
    }

    /// Midpoint of the best bid and best ask.
    pub fn mid_price(&self) -> Result<f64, PriceSourceError> {
        let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) else {
            return Err(PriceSourceError::EmptyBook(self.coin.clone()));
        };

        let bid: f64 = bid.px.parse()?;
        let ask: f64 = ask.px.parse()?;
        let mid = (bid + ask) / 2.0;

        if !mid.is_finite() || bid <= 0.0 || ask <= 0.0 {
            return Err(PriceSourceError::InvalidPrice(mid));
        }

        Ok(mid)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetMeta {
    pub name: String,
    #[serde(rename = "szDecimals", default)]
    pub sz_decimals: u32,
}

/// Response to `{"type":"meta"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub universe: Vec<AssetMeta>,
}

impl Meta {
    pub fn lists(&self, asset: &str) -> bool {
        self.universe.iter().any(|a| a.name == asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = r#"{
        "coin": "SOL",
        "time": 1754450974231,
        "levels": [
            [{"px": "41.20", "sz": "120.5", "n": 3}, {"px": "41.10", "sz": "80.0", "n": 2}],
            [{"px": "41.30", "sz": "95.1", "n": 4}, {"px": "41.40", "sz": "12.0", "n": 1}]
        ]
    }"#;

    #[test]
    fn mid_price_uses_best_bid_and_best_ask() {
        let book: L2Book = serde_json::from_str(BOOK).unwrap();

        assert_eq!(book.best_bid().unwrap().px, "41.20");
        assert_eq!(book.best_ask().unwrap().px, "41.30");
        assert!((book.mid_price().unwrap() - 41.25).abs() < 1e-9);
    }

    #[test]
    fn one_sided_book_is_empty() {
        let book: L2Book = serde_json::from_str(
            r#"{"coin":"SOL","time":0,"levels":[[{"px":"41.2","sz":"1","n":1}],[]]}"#,
        )
        .unwrap();

        assert!(matches!(
            book.mid_price(),
            Err(PriceSourceError::EmptyBook(coin)) if coin == "SOL"
        ));
    }

    #[test]
    fn garbage_price_is_a_parse_error() {
        let book: L2Book = serde_json::from_str(
            r#"{"coin":"SOL","time":0,"levels":[[{"px":"abc","sz":"1","n":1}],[{"px":"41","sz":"1","n":1}]]}"#,
        )
        .unwrap();

        assert!(matches!(book.mid_price(), Err(PriceSourceError::ParseFloat(_))));
    }

    #[test]
    fn zero_bid_is_invalid() {
        let book: L2Book = serde_json::from_str(
            r#"{"coin":"SOL","time":0,"levels":[[{"px":"0","sz":"1","n":1}],[{"px":"41","sz":"1","n":1}]]}"#,
        )
        .unwrap();

        assert!(matches!(book.mid_price(), Err(PriceSourceError::InvalidPrice(_))));
    }

    #[test]
    fn request_bodies_match_api() {
        assert_eq!(
            serde_json::to_value(InfoRequest::L2Book { coin: "SOL" }).unwrap(),
            serde_json::json!({"type": "l2Book", "coin": "SOL"})
        );
        assert_eq!(
            serde_json::to_value(InfoRequest::Meta).unwrap(),
            serde_json::json!({"type": "meta"})
        );
    }

    #[test]
    fn meta_lookup() {
        let meta: Meta = serde_json::from_str(
            r#"{"universe":[{"name":"BTC","szDecimals":5},{"name":"SOL","szDecimals":2}]}"#,
        )
        .unwrap();

        assert!(meta.lists("SOL"));
        assert!(!meta.lists("DOGE"));
    }
}
