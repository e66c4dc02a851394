//! Fixed-capacity ring buffer of pass/fail outcomes for one check type.

use chrono::{DateTime, Utc};

/// Recent outcomes for one check type plus its derived flap state.
#[derive(Debug, Clone)]
pub struct CheckHistory {
    results: Vec<bool>,
    timestamps: Vec<Option<DateTime<Utc>>>,
    /// Next write index.
    pos: usize,
    /// Valid entries, saturating at capacity.
    count: usize,
    pub(crate) flapping: bool,
    pub(crate) suppressed: u64,
    pub(crate) last_sent: Option<DateTime<Utc>>,
}

impl CheckHistory {
    pub fn new(window_size: usize) -> Self {
        Self {
            results: vec![false; window_size],
            timestamps: vec![None; window_size],
            pos: 0,
            count: 0,
            flapping: false,
            suppressed: 0,
            last_sent: None,
        }
    }

    /// Write one outcome at the current position and advance.
    pub fn record(&mut self, passed: bool, at: DateTime<Utc>) {
        let capacity = self.results.len();
        self.results[self.pos] = passed;
        self.timestamps[self.pos] = Some(at);
        self.pos = (self.pos + 1) % capacity;
        if self.count < capacity {
            self.count += 1;
        }
    }

    /// Number of valid entries.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.results.len()
    }

    /// Valid entries, oldest first.
    pub fn chronological(&self) -> Vec<bool> {
        self.ordered_indices().map(|i| self.results[i]).collect()
    }

    /// Number of adjacent oldest→newest pairs whose outcomes differ.
    pub fn transitions(&self) -> usize {
        let ordered = self.chronological();
        ordered.windows(2).filter(|w| w[0] != w[1]).count()
    }

    /// Whether the newest `n` entries are all equal.
    ///
    /// False while fewer than `n` entries exist.
    pub fn stabilized(&self, n: usize) -> bool {
        if n == 0 || self.count < n {
            return false;
        }
        let ordered = self.chronological();
        let tail = &ordered[ordered.len() - n..];
        tail.iter().all(|v| *v == tail[0])
    }

    /// Time of the newest observation.
    pub fn last_observed(&self) -> Option<DateTime<Utc>> {
        if self.count == 0 {
            return None;
        }
        let capacity = self.results.len();
        self.timestamps[(self.pos + capacity - 1) % capacity]
    }

    pub fn is_flapping(&self) -> bool {
        self.flapping
    }

    /// Events suppressed during the current flap episode.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn last_sent(&self) -> Option<DateTime<Utc>> {
        self.last_sent
    }

    fn ordered_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let capacity = self.results.len();
        // Before the buffer fills, entries sit at 0..count and pos == count.
        let start = if self.count < capacity { 0 } else { self.pos };
        (0..self.count).map(move |offset| (start + offset) % capacity)
    }
}
