use chrono::NaiveDate;

use crate::{labels::LabelTable, storage::dataset::UsageDataset, utils::time::shift_days};

use super::{Bucket, Calendar};

const DAYS_IN_WEEK: usize = 7;

impl Calendar {
    /// The 7 dates of the week containing `reference`, moved by `offset_weeks` whole weeks.
    /// Negative offsets go into the past.
    pub fn week_buckets(&self, reference: NaiveDate, offset_weeks: i64) -> Bucket {
        let start = shift_days(
            self.week_start.start_of_week(reference),
            offset_weeks * DAYS_IN_WEEK as i64,
        );
        start.iter_days().take(DAYS_IN_WEEK).collect()
    }

    pub fn week_labels(&self, labels: &LabelTable) -> Vec<String> {
        labels.weekdays_from(self.week_start)
    }

    pub fn week_series(
        &self,
        dataset: &UsageDataset,
        reference: NaiveDate,
        offset_weeks: i64,
    ) -> Vec<u64> {
        self.week_buckets(reference, offset_weeks)
            .into_iter()
            .map(|date| dataset.seconds_on(date))
            .collect()
    }

    pub fn week_sum(
        &self,
        dataset: &UsageDataset,
        reference: NaiveDate,
        offset_weeks: i64,
    ) -> u64 {
        dataset.bucket_total(&self.week_buckets(reference, offset_weeks))
    }

    /// Sum of the week at `offset_weeks` and sum of the week before it.
    pub fn compare_to_previous_week(
        &self,
        dataset: &UsageDataset,
        reference: NaiveDate,
        offset_weeks: i64,
    ) -> (u64, u64) {
        (
            self.week_sum(dataset, reference, offset_weeks),
            self.week_sum(dataset, reference, offset_weeks - 1),
        )
    }

    /// Average daily usage of a week, counting only days up to and including `reference`. For
    /// the running week the days that haven't happened yet don't drag the average down. Rounded
    /// to the nearest second.
    pub fn week_average(
        &self,
        dataset: &UsageDataset,
        reference: NaiveDate,
        offset_weeks: i64,
    ) -> u64 {
        let elapsed = self
            .week_buckets(reference, offset_weeks)
            .into_iter()
            .filter(|date| *date <= reference)
            .collect::<Vec<_>>();
        if elapsed.is_empty() {
            return 0;
        }
        let sum = dataset.bucket_total(&elapsed);
        (sum as f64 / elapsed.len() as f64).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Weekday};

    use crate::{
        aggregate::{Calendar, MonthPartition, WeekStart},
        storage::dataset::UsageDataset,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> UsageDataset {
        UsageDataset::new()
            .with(date(2024, 1, 1), 3600)
            .with(date(2024, 1, 3), 1800)
    }

    #[test]
    fn week_of_a_wednesday() {
        let calendar = Calendar::default();
        let reference = date(2024, 1, 3);

        let buckets = calendar.week_buckets(reference, 0);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0], date(2024, 1, 1));
        assert_eq!(buckets[6], date(2024, 1, 7));

        assert_eq!(
            calendar.week_series(&sample(), reference, 0),
            vec![3600, 0, 1800, 0, 0, 0, 0]
        );
        assert_eq!(calendar.week_sum(&sample(), reference, 0), 5400);
        assert_eq!(calendar.week_average(&sample(), reference, 0), 1800);
    }

    #[test]
    fn offsets_move_whole_weeks() {
        let calendar = Calendar::default();
        let reference = date(2024, 1, 10);

        let previous = calendar.week_buckets(reference, -1);
        assert_eq!(previous[0], date(2024, 1, 1));
        assert_eq!(calendar.week_sum(&sample(), reference, -1), 5400);

        let next = calendar.week_buckets(reference, 1);
        assert_eq!(next[0], date(2024, 1, 15));
        assert_eq!(calendar.week_sum(&sample(), reference, 1), 0);
    }

    #[test]
    fn sunday_weeks_cross_year_boundary() {
        let calendar = Calendar::new(WeekStart::Sunday, MonthPartition::FixedChunk);
        let buckets = calendar.week_buckets(date(2024, 1, 3), 0);
        assert_eq!(buckets[0], date(2023, 12, 31));
        assert_eq!(buckets[0].weekday(), Weekday::Sun);
        assert!(buckets.windows(2).all(|w| w[0].succ_opt() == Some(w[1])));
    }

    #[test]
    fn sum_matches_series() {
        let calendar = Calendar::default();
        let dataset = (0..40)
            .map(|i| (date(2024, 2, 1) + chrono::Duration::days(i), i as u64 * 10))
            .collect::<UsageDataset>();
        for offset in -3..3 {
            let series = calendar.week_series(&dataset, date(2024, 2, 20), offset);
            assert_eq!(series.len(), 7);
            assert_eq!(
                calendar.week_sum(&dataset, date(2024, 2, 20), offset),
                series.iter().sum::<u64>()
            );
        }
    }

    #[test]
    fn this_week_against_last_week() {
        let calendar = Calendar::default();
        let dataset = sample().with(date(2024, 1, 9), 100);

        assert_eq!(
            calendar.compare_to_previous_week(&dataset, date(2024, 1, 10), 0),
            (100, 5400)
        );
        assert_eq!(
            calendar.compare_to_previous_week(&dataset, date(2024, 1, 10), -1),
            (5400, 0)
        );
    }

    #[test]
    fn average_ignores_future_days() {
        let calendar = Calendar::default();
        let reference = date(2024, 1, 4);
        let dataset = UsageDataset::new().with(reference, 700);

        // Only today has data, the first 3 days of the week are zero.
        assert_eq!(calendar.week_average(&dataset, reference, 0), 175);

        // Monday is the only elapsed day.
        let monday = date(2024, 1, 1);
        let dataset = UsageDataset::new().with(monday, 700);
        assert_eq!(calendar.week_average(&dataset, monday, 0), 700);
    }

    #[test]
    fn average_of_past_and_future_weeks() {
        let calendar = Calendar::default();
        let reference = date(2024, 1, 10);
        let dataset = UsageDataset::new()
            .with(date(2024, 1, 1), 5)
            .with(date(2024, 1, 2), 5);

        // round(10 / 7)
        assert_eq!(calendar.week_average(&dataset, reference, -1), 1);
        assert_eq!(calendar.week_average(&dataset, reference, 1), 0);
    }

    #[test]
    fn average_rounds_half_up() {
        let calendar = Calendar::default();
        let reference = date(2024, 1, 2);
        let dataset = UsageDataset::new().with(date(2024, 1, 1), 3);
        assert_eq!(calendar.week_average(&dataset, reference, 0), 2);
    }
}
