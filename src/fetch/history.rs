use crate::fetch::FetchStatus;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

/// Record of a single fetch attempt
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub timestamp: DateTime<Utc>,
    pub url: String,
    /// 1-based attempt number within one fetch
    pub attempt: u32,
    pub status: FetchStatus,
    pub success: bool,
}

impl FetchOutcome {
    pub fn new(url: &str, attempt: u32, status: FetchStatus) -> Self {
        Self {
            timestamp: Utc::now(),
            url: url.to_string(),
            attempt,
            status,
            success: status == FetchStatus::Success,
        }
    }
}

/// Bounded rolling history of attempt outcomes, oldest first
#[derive(Debug, Clone)]
pub struct FetchHistory {
    outcomes: VecDeque<FetchOutcome>,
    capacity: usize,
}

impl FetchHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an outcome, evicting the oldest once full
    pub fn record(&mut self, outcome: FetchOutcome) {
        if self.outcomes.len() == self.capacity {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(outcome);
    }

    /// Share of successes among the `window` most recent outcomes
    ///
    /// Returns None while the history is empty.
    pub fn success_rate(&self, window: usize) -> Option<f64> {
        let window = window.max(1);
        let recent: Vec<&FetchOutcome> = self.outcomes.iter().rev().take(window).collect();

        if recent.is_empty() {
            return None;
        }

        let successes = recent.iter().filter(|o| o.success).count();
        Some(successes as f64 / recent.len() as f64)
    }

    pub fn counts_by_status(&self) -> HashMap<FetchStatus, usize> {
        let mut counts = HashMap::new();
        for outcome in &self.outcomes {
            *counts.entry(outcome.status).or_insert(0) += 1;
        }
        counts
    }

    pub fn iter(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter()
    }

    pub fn last(&self) -> Option<&FetchOutcome> {
        self.outcomes.back()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
