pub mod history;
pub mod pulse;
pub mod source;

pub use history::{HistoryError, PriceHistory};
pub use pulse::probability::breach_probability;
pub use pulse::statistics::{PriceStatistics, compute_statistics};
pub use pulse::trend::{TrendLabel, classify_trend};
pub use source::{PriceSource, PriceSourceError};
