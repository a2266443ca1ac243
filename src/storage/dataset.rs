use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::time::date_to_key;

use super::DateKeyedRecords;

/// Seconds of usage per day. Read-only for everything in [crate::aggregate].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageDataset(HashMap<String, u64>);

impl UsageDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seconds_on(&self, date: NaiveDate) -> u64 {
        self.seconds_for(&date_to_key(date))
    }

    pub fn seconds_for(&self, key: &str) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    /// Sum of usage over every date of a bucket.
    pub fn bucket_total(&self, bucket: &[NaiveDate]) -> u64 {
        bucket
            .iter()
            .fold(0u64, |sum, date| sum.saturating_add(self.seconds_on(*date)))
    }

    pub fn insert(&mut self, date: NaiveDate, seconds: u64) {
        self.0.insert(date_to_key(date), seconds);
    }

    pub fn with(mut self, date: NaiveDate, seconds: u64) -> Self {
        self.insert(date, seconds);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(NaiveDate, u64)> for UsageDataset {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, u64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(date, seconds)| (date_to_key(date), seconds))
                .collect(),
        )
    }
}

impl DateKeyedRecords for UsageDataset {
    fn days(&self) -> usize {
        self.len()
    }

    fn retain_keys(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|key, _| keep(key));
    }
}
