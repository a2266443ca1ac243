//! Usage data is handed to the aggregator as date keyed records.
//!  - [dataset::UsageDataset] maps `YYYY-MM-DD` keys to seconds of usage on that day.
//!  - [app_usage::AppUsageDataset] maps the same keys to seconds per application.
//!  - Days that are missing count as zero usage.
//!  - Where the records come from is hidden behind [source::UsageSource].

pub mod app_usage;
pub mod dataset;
pub mod source;

use serde::de::DeserializeOwned;

/// Records keyed by `YYYY-MM-DD` strings that can be loaded from a [source::UsageSource].
pub trait DateKeyedRecords: DeserializeOwned + Default + Send + 'static {
    /// Number of days with records.
    fn days(&self) -> usize;

    /// Keeps only the days whose key satisfies `keep`.
    fn retain_keys(&mut self, keep: impl FnMut(&str) -> bool);
}
