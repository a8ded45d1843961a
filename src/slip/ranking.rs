//! Bounded top-N retention of scored combinations

use super::types::rank_cmp;
use super::DrawOrder;
use std::cmp::Ordering;

/// Leg indices into a filtered pool plus their score
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredCombo {
    /// Sorted pool indices
    pub legs: Vec<usize>,
    pub combined_prob: f64,
    pub combined_edge: f64,
    pub draw: DrawOrder,
}

impl ScoredCombo {
    fn key(&self) -> (f64, f64, DrawOrder) {
        (self.combined_edge, self.combined_prob, self.draw)
    }
}

/// Best `capacity` distinct combinations seen so far
///
/// A leg set offered twice keeps its earliest draw.
#[derive(Debug, Clone)]
pub(crate) struct TopN {
    capacity: usize,
    entries: Vec<ScoredCombo>,
}

impl TopN {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Offer a combination; returns whether it was retained
    pub fn offer(&mut self, combo: ScoredCombo) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if let Some(idx) = self.entries.iter().position(|e| e.legs == combo.legs) {
            if combo.draw >= self.entries[idx].draw {
                return false;
            }
            self.entries.remove(idx);
        } else if self.entries.len() >= self.capacity {
            match self.entries.last() {
                Some(worst) if rank_cmp(combo.key(), worst.key()) == Ordering::Less => {}
                _ => return false,
            }
        }

        let pos = self
            .entries
            .partition_point(|e| rank_cmp(e.key(), combo.key()) == Ordering::Less);
        self.entries.insert(pos, combo);
        self.entries.truncate(self.capacity);
        true
    }

    /// Fold another worker's retained set into this one
    pub fn merge(&mut self, other: TopN) {
        for combo in other.entries {
            self.offer(combo);
        }
    }

    /// Retained combinations, best first
    pub fn into_sorted(self) -> Vec<ScoredCombo> {
        self.entries
    }
}
