use chrono::{Datelike, NaiveDate};

use crate::{labels::LabelTable, storage::dataset::UsageDataset, utils::time::month_days};

use super::{Bucket, Chart};

/// Every date of the year containing `reference`, grouped by month.
pub fn year_month_buckets(reference: NaiveDate) -> Vec<Bucket> {
    (1..=12)
        .map(|month| {
            let first = NaiveDate::from_ymd_opt(reference.year(), month, 1)
                .expect("Every month has a first day");
            month_days(first)
        })
        .collect()
}

pub fn year_month_series(dataset: &UsageDataset, reference: NaiveDate) -> Vec<u64> {
    year_month_buckets(reference)
        .iter()
        .map(|bucket| dataset.bucket_total(bucket))
        .collect()
}

pub fn year_month_labels(labels: &LabelTable) -> Vec<String> {
    labels.months().to_vec()
}

pub fn year_chart(labels: &LabelTable, dataset: &UsageDataset, reference: NaiveDate) -> Chart {
    Chart::new_opt(
        year_month_labels(labels),
        year_month_series(dataset, reference),
    )
    .expect("Validated label table has a label for every month")
}
