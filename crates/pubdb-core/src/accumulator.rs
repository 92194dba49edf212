//! Fixed-size row buffer between the transformer and the sink

use crate::transform::FlatRecord;

/// Default number of rows buffered before a flush.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Buffers flat rows until the flush threshold is reached.
#[derive(Debug)]
pub struct BatchAccumulator {
    rows: Vec<FlatRecord>,
    threshold: usize,
}

impl BatchAccumulator {
    /// A threshold of 0 is treated as 1 so every row flushes on its own.
    pub fn with_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            rows: Vec::with_capacity(threshold.min(DEFAULT_BATCH_SIZE)),
            threshold,
        }
    }

    /// Push a row into the buffer
    pub fn push(&mut self, row: FlatRecord) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Check if buffer is full and should be flushed
    pub fn should_flush(&self) -> bool {
        self.rows.len() >= self.threshold
    }

    /// Take buffered rows in insertion order, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<FlatRecord> {
        std::mem::replace(&mut self.rows, Vec::with_capacity(self.threshold.min(DEFAULT_BATCH_SIZE)))
    }
}

impl Default for BatchAccumulator {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: usize) -> FlatRecord {
        [("id", id.to_string())].into_iter().collect()
    }

    #[test]
    fn flushes_at_threshold() {
        let mut acc = BatchAccumulator::with_threshold(3);
        acc.push(row(1));
        acc.push(row(2));
        assert!(!acc.should_flush());
        acc.push(row(3));
        assert!(acc.should_flush());
    }

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut acc = BatchAccumulator::with_threshold(10);
        for i in 0..4 {
            acc.push(row(i));
        }
        let rows = acc.drain();
        let ids: Vec<_> = rows.iter().map(|r| r.get("id").unwrap()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3"]);
        assert!(acc.is_empty());
        assert!(!acc.should_flush());
    }

    #[test]
    fn zero_threshold_clamped() {
        let mut acc = BatchAccumulator::with_threshold(0);
        assert_eq!(acc.threshold(), 1);
        acc.push(row(1));
        assert!(acc.should_flush());
    }

    #[test]
    fn default_threshold() {
        assert_eq!(BatchAccumulator::default().threshold(), DEFAULT_BATCH_SIZE);
    }
}
