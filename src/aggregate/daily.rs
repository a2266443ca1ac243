use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    storage::dataset::UsageDataset,
    utils::time::{date_to_key, shift_days},
};

/// Key of the day `offset_days` before `reference`.
pub fn date_key(reference: NaiveDate, offset_days: i64) -> String {
    date_to_key(shift_days(reference, -offset_days))
}

/// Usage on `reference` and on the day before it.
pub fn compare_to_yesterday(dataset: &UsageDataset, reference: NaiveDate) -> (u64, u64) {
    (
        dataset.seconds_for(&date_key(reference, 0)),
        dataset.seconds_for(&date_key(reference, 1)),
    )
}

/// Relative change of `current` against `previous`, in percent. There's nothing to compare
/// against when `previous` is zero.
pub fn change_percent(current: u64, previous: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayComparison {
    pub today: u64,
    pub yesterday: u64,
}

impl DayComparison {
    pub fn new(dataset: &UsageDataset, reference: NaiveDate) -> Self {
        compare_to_yesterday(dataset, reference).into()
    }

    pub fn change_percent(&self) -> Option<f64> {
        change_percent(self.today, self.yesterday)
    }
}

impl From<(u64, u64)> for DayComparison {
    fn from((today, yesterday): (u64, u64)) -> Self {
        Self { today, yesterday }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{change_percent, compare_to_yesterday, date_key, DayComparison};
    use crate::storage::dataset::UsageDataset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn keys_count_backwards() {
        assert_eq!(date_key(date(2024, 3, 1), 0), "2024-03-01");
        assert_eq!(date_key(date(2024, 3, 1), 1), "2024-02-29");
        assert_eq!(date_key(date(2024, 3, 1), -1), "2024-03-02");
    }

    #[test]
    fn today_against_yesterday() {
        let dataset = UsageDataset::new()
            .with(date(2024, 6, 10), 100)
            .with(date(2024, 6, 9), 50);
        assert_eq!(compare_to_yesterday(&dataset, date(2024, 6, 10)), (100, 50));

        let dataset = UsageDataset::new().with(date(2024, 6, 10), 100);
        assert_eq!(compare_to_yesterday(&dataset, date(2024, 6, 10)), (100, 0));
    }

    #[test]
    fn change_against_zero_is_undefined() {
        assert_eq!(change_percent(10, 0), None);
        assert_eq!(change_percent(0, 10), Some(-100.));
        assert_eq!(change_percent(u64::MAX, u64::MAX), Some(0.));
    }

    #[test]
    fn day_change_percent() {
        let comparison = DayComparison::from((150, 100));
        assert_eq!(comparison.change_percent(), Some(50.));
        assert_eq!(DayComparison::from((50, 100)).change_percent(), Some(-50.));
        assert_eq!(DayComparison::from((50, 0)).change_percent(), None);

        let dataset = UsageDataset::new().with(date(2024, 1, 1), 30);
        assert_eq!(
            DayComparison::new(&dataset, date(2024, 1, 1)),
            DayComparison {
                today: 30,
                yesterday: 0
            }
        );
    }
}
