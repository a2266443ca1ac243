use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::trace;

use crate::storage::app_usage::AppUsageDataset;

use super::{Calendar, Chart, Period};

/// Total usage of one application over a span of days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUsage {
    pub app_name: String,
    pub seconds: u64,
}

/// Usage of every application over `dates`, longest first. Ties are ordered by name so the result
/// doesn't depend on map order.
pub fn app_totals(dataset: &AppUsageDataset, dates: &[NaiveDate]) -> Vec<AppUsage> {
    let mut totals = HashMap::<&str, u64>::new();
    for date in dates {
        for (app, seconds) in dataset.apps_on(*date) {
            let total = totals.entry(app).or_default();
            *total = total.saturating_add(seconds);
        }
    }

    let mut usages = totals
        .into_iter()
        .map(|(app_name, seconds)| AppUsage {
            app_name: app_name.to_string(),
            seconds,
        })
        .collect::<Vec<_>>();
    usages.sort_by(|a, b| {
        b.seconds
            .cmp(&a.seconds)
            .then_with(|| a.app_name.cmp(&b.app_name))
    });
    usages
}

impl Calendar {
    /// Chart of application usage over the same days the chart of `period` covers. Labels are
    /// application names. `top` keeps only the longest used applications.
    pub fn app_chart(
        &self,
        period: Period,
        dataset: &AppUsageDataset,
        reference: NaiveDate,
        top: Option<usize>,
    ) -> Chart {
        let mut usages = app_totals(dataset, &self.period_dates(period, reference));
        if let Some(top) = top {
            usages.truncate(top);
        }
        trace!("{} applications used in {period} around {reference}", usages.len());
        let (labels, values) = usages
            .into_iter()
            .map(|usage| (usage.app_name, usage.seconds))
            .unzip();
        Chart::new_opt(labels, values).expect("Every application has a name")
    }
}
