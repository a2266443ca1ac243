use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::time::{date_to_key, key_to_date};

use super::{dataset::UsageDataset, DateKeyedRecords};

/// Seconds of usage per application per day, `{"YYYY-MM-DD": {"app": seconds}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppUsageDataset(HashMap<String, HashMap<String, u64>>);

/// One exported record, the usage of a single application on a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppUsageRow {
    pub date: NaiveDate,
    pub app_name: String,
    pub total_usage: u64,
}

impl AppUsageDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Usage per application on `date`. Empty if nothing was recorded.
    pub fn apps_on(&self, date: NaiveDate) -> impl Iterator<Item = (&str, u64)> {
        self.0
            .get(&date_to_key(date))
            .into_iter()
            .flatten()
            .map(|(app, seconds)| (app.as_str(), *seconds))
    }

    pub fn insert(&mut self, date: NaiveDate, app: &str, seconds: u64) {
        self.0
            .entry(date_to_key(date))
            .or_default()
            .insert(app.to_string(), seconds);
    }

    pub fn with(mut self, date: NaiveDate, app: &str, seconds: u64) -> Self {
        self.insert(date, app, seconds);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total usage per day over every application.
    pub fn daily_totals(&self) -> UsageDataset {
        self.0
            .keys()
            .filter_map(|key| key_to_date(key))
            .map(|date| {
                let total = self
                    .apps_on(date)
                    .fold(0u64, |sum, (_, seconds)| sum.saturating_add(seconds));
                (date, total)
            })
            .collect()
    }

    /// Every record from `start` to `end`, both inclusive, ordered by date and then by name.
    pub fn rows_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<AppUsageRow> {
        let mut days = BTreeMap::new();
        for (key, apps) in &self.0 {
            if let Some(date) = key_to_date(key).filter(|date| (start..=end).contains(date)) {
                days.insert(date, apps);
            }
        }
        days.into_iter()
            .flat_map(|(date, apps)| {
                let mut rows = apps
                    .iter()
                    .map(|(app_name, total_usage)| AppUsageRow {
                        date,
                        app_name: app_name.clone(),
                        total_usage: *total_usage,
                    })
                    .collect::<Vec<_>>();
                rows.sort_by(|a, b| a.app_name.cmp(&b.app_name));
                rows
            })
            .collect()
    }
}

impl DateKeyedRecords for AppUsageDataset {
    fn days(&self) -> usize {
        self.0.len()
    }

    fn retain_keys(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|key, _| keep(key));
    }
}
