use chrono::NaiveDate;
use tracing::trace;

use crate::{
    labels::LabelTable,
    storage::dataset::UsageDataset,
    utils::time::{days_in_month, month_days, month_start, shift_days},
};

use super::{Bucket, Calendar, MonthPartition};

impl Calendar {
    /// Splits the month containing `reference` into weekly buckets according to
    /// [Calendar::partition]. Buckets are returned in chronological order.
    pub fn month_week_buckets(&self, reference: NaiveDate) -> Vec<Bucket> {
        let buckets: Vec<Bucket> = match self.partition {
            MonthPartition::FixedChunk => month_days(reference)
                .chunks(7)
                .map(<[NaiveDate]>::to_vec)
                .collect(),
            MonthPartition::CalendarWeeks => {
                let first = month_start(reference);
                let last = shift_days(first, days_in_month(reference) as i64 - 1);
                let start = self.week_start.start_of_week(first);
                let end = shift_days(self.week_start.start_of_week(last), 6);
                let days = start
                    .iter_days()
                    .take_while(|date| *date <= end)
                    .collect::<Vec<_>>();
                days.chunks(7).map(<[NaiveDate]>::to_vec).collect()
            }
        };
        trace!(
            "Month of {reference} split into {} buckets using {}",
            buckets.len(),
            self.partition
        );
        buckets
    }

    pub fn month_week_series(&self, dataset: &UsageDataset, reference: NaiveDate) -> Vec<u64> {
        self.month_week_buckets(reference)
            .iter()
            .map(|bucket| dataset.bucket_total(bucket))
            .collect()
    }

    /// One ordinal label per bucket. The number of weeks depends on the month and the partition,
    /// so labels are always generated from the buckets themselves.
    pub fn month_week_labels(&self, labels: &LabelTable, reference: NaiveDate) -> Vec<String> {
        (1..=self.month_week_buckets(reference).len())
            .map(|number| labels.week_of_month(number))
            .collect()
    }
}
