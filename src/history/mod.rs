//! Bounded in-memory history of periodic samples
//!
//! Keeps one day of minute samples for charting. Purely in-memory,
//! process lifetime only.

use crate::core::HistorySample;
use std::collections::VecDeque;

/// Maximum retained samples (one day at one sample per minute)
const HISTORY_CAPACITY: usize = 1440;

/// Fixed-capacity FIFO ring buffer of history samples
pub struct HistoryBuffer {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer with the default one-day capacity
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Create an empty buffer with a custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting from the front once capacity is exceeded.
    ///
    /// Existing entries are never mutated.
    pub fn append(&mut self, sample: HistorySample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Retained samples, oldest first
    pub fn snapshot(&self) -> Vec<HistorySample> {
        self.samples.iter().cloned().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: i64) -> HistorySample {
        HistorySample {
            timestamp,
            power: 100.0,
            cost_per_hour: 0.012,
            cost_today: 0.1,
        }
    }

    #[test]
    fn test_append_and_snapshot_order() {
        let mut buffer = HistoryBuffer::new();
        for t in 0..10 {
            buffer.append(sample(t));
        }

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot.first().unwrap().timestamp, 0);
        assert_eq!(snapshot.last().unwrap().timestamp, 9);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut buffer = HistoryBuffer::new();
        for t in 0..1441 {
            buffer.append(sample(t));
        }

        assert_eq!(buffer.len(), 1440);
        let snapshot = buffer.snapshot();
        // The first-appended sample is gone; 1..=1440 remain in order
        assert_eq!(snapshot.first().unwrap().timestamp, 1);
        assert_eq!(snapshot.last().unwrap().timestamp, 1440);
        for (i, s) in snapshot.iter().enumerate() {
            assert_eq!(s.timestamp, i as i64 + 1);
        }
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = HistoryBuffer::with_capacity(5);
        for t in 0..100 {
            buffer.append(sample(t));
            assert!(buffer.len() <= 5);
        }
        assert_eq!(buffer.snapshot().first().unwrap().timestamp, 95);
    }
}
