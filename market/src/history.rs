use std::collections::VecDeque;

use thiserror::Error;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("rejected price sample {0}: must be finite and positive")]
    InvalidSample(f64),

    #[error("history capacity must be at least 1")]
    ZeroCapacity,
}

/// Bounded FIFO of observed prices, oldest first.
///
/// Invariant: `len() <= capacity()`. Once full, every insert evicts the oldest value,
/// so the contents are always the last `min(capacity, inserts)` accepted samples in
/// arrival order.
#[derive(Clone, Debug)]
pub struct PriceHistory {
    values: VecDeque<f64>,
    capacity: usize,
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self {
            values: VecDeque::with_capacity(DEFAULT_CAPACITY),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl PriceHistory {
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::ZeroCapacity);
        }

        Ok(Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Appends a sample. Non-finite or non-positive prices are refused and leave the
    /// history untouched.
    pub fn push(&mut self, price: f64) -> Result<(), HistoryError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(HistoryError::InvalidSample(price));
        }

        self.values.push_back(price);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Ordered copy of the current contents.
    pub fn snapshot(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}
