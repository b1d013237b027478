//! In-memory append-only log of past forecasts. Operational history for
//! display and debugging, not a system of record: cleared on restart.

use parking_lot::Mutex;

use crate::types::RaceForecast;

/// Append-only forecast log guarded by a mutex so concurrent request handlers
/// never lose an entry. Unbounded unless a soft cap is configured.
pub struct HistoryStore {
    entries: Mutex<Vec<RaceForecast>>,
    cap: Option<usize>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            cap: None,
        }
    }

    /// Keep at most `cap` forecasts, dropping the oldest on overflow.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            cap: Some(cap),
        }
    }

    pub fn append(&self, forecast: RaceForecast) {
        let mut entries = self.entries.lock();
        if let Some(cap) = self.cap {
            while entries.len() >= cap.max(1) {
                entries.remove(0);
            }
        }
        entries.push(forecast);
    }

    /// Most recent first.
    pub fn list(&self, limit: usize) -> Vec<RaceForecast> {
        let entries = self.entries.lock();
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
