//! Global merge ordering over per-pair candidate lists
//!
//! Candidates are grouped by the unordered section pair they join. Each pair
//! keeps a short ranked list so cheaper alternatives for the same pair are
//! tried first without being regenerated, and the heap orders pairs by their
//! current cheapest candidate.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::algorithm::candidate::{MergeCandidate, PairKey};

/// Ranked candidates for one section pair
#[derive(Clone, Debug)]
pub struct CandidateList {
    /// Sorted most expensive first so the cheapest pops from the end
    candidates: Vec<MergeCandidate>,
}

impl CandidateList {
    /// Rank `candidates`; returns `None` when there are none
    pub fn new(mut candidates: Vec<MergeCandidate>) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_unstable_by(|a, b| b.cmp(a));
        Some(Self { candidates })
    }

    /// Cheapest remaining candidate
    pub fn peek(&self) -> Option<&MergeCandidate> {
        self.candidates.last()
    }

    /// Remove and return the cheapest remaining candidate
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        self.candidates.pop()
    }

    /// Number of remaining candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no candidates remain
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl PartialEq for CandidateList {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CandidateList {}

impl PartialOrd for CandidateList {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CandidateList {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the cheapest head first
        match (self.peek(), other.peek()) {
            (Some(mine), Some(theirs)) => theirs.cmp(mine),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Scheduler activity counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Candidate lists pushed
    pub enqueued: usize,
    /// Candidates applied successfully
    pub applied: usize,
    /// Candidates discarded because an operand was already merged
    pub stale: usize,
}

/// Priority structure that always yields the globally cheapest pair list
#[derive(Debug, Default)]
pub struct MergeScheduler {
    queue: BinaryHeap<CandidateList>,
    /// Activity counters
    pub stats: SchedulerStats,
}

impl MergeScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Group `candidates` by section pair and enqueue one list per pair
    ///
    /// Returns the number of lists pushed.
    pub fn push(&mut self, candidates: impl IntoIterator<Item = MergeCandidate>) -> usize {
        let mut by_pair: BTreeMap<PairKey, Vec<MergeCandidate>> = BTreeMap::new();
        for candidate in candidates {
            by_pair.entry(candidate.pair()).or_default().push(candidate);
        }

        let mut pushed = 0;
        for group in by_pair.into_values() {
            if let Some(list) = CandidateList::new(group) {
                self.push_list(list);
                pushed += 1;
            }
        }
        pushed
    }

    /// Enqueue an existing list; empty lists are dropped
    pub fn push_list(&mut self, list: CandidateList) {
        if !list.is_empty() {
            self.stats.enqueued += 1;
            self.queue.push(list);
        }
    }

    /// Remove the list whose cheapest candidate is globally cheapest
    pub fn pop_list(&mut self) -> Option<CandidateList> {
        self.queue.pop()
    }

    /// Cheapest candidate across all lists
    pub fn peek(&self) -> Option<&MergeCandidate> {
        self.queue.peek().and_then(CandidateList::peek)
    }

    /// Record a successfully applied candidate
    pub const fn record_applied(&mut self) {
        self.stats.applied += 1;
    }

    /// Record a discarded stale candidate
    pub const fn record_stale(&mut self) {
        self.stats.stale += 1;
    }

    /// Number of queued lists
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every queued list
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
