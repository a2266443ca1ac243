//! Turns a day keyed [UsageDataset] into labelled series for a chart.
//!
//! Every function here is pure. The "current" date is always passed in as `reference`, so the same
//! arguments always give the same result. Bucketing conventions are held by a [Calendar]:
//!  - weeks start on [WeekStart::Monday] unless configured otherwise.
//!  - months are split with [MonthPartition::FixedChunk] unless configured otherwise.

pub mod apps;
pub mod daily;
pub mod month;
pub mod week;
pub mod year;

use std::fmt::Display;

use chrono::{Datelike, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::{labels::LabelTable, storage::dataset::UsageDataset, utils::time::shift_days};

/// A contiguous, chronologically ordered run of dates aggregated into one chart value.
pub type Bucket = Vec<NaiveDate>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    /// First day of the week that contains `date`.
    pub fn start_of_week(self, date: NaiveDate) -> NaiveDate {
        let back = (7 + date.weekday().num_days_from_monday()
            - self.weekday().num_days_from_monday())
            % 7;
        shift_days(date, -(back as i64))
    }
}

impl Display for WeekStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekStart::Monday => write!(f, "monday"),
            WeekStart::Sunday => write!(f, "sunday"),
        }
    }
}

/// How the days of a month are grouped into weeks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonthPartition {
    /// Days 1-7, 8-14, ... of the month. The last bucket is usually shorter than 7 days.
    #[default]
    FixedChunk,
    /// Whole calendar weeks from the week holding the 1st to the week holding the last day. The
    /// first and last buckets may contain days of the neighbouring months.
    CalendarWeeks,
}

impl Display for MonthPartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonthPartition::FixedChunk => write!(f, "fixed-chunk"),
            MonthPartition::CalendarWeeks => write!(f, "calendar-weeks"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    Monthly,
    Yearly,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Weekly => write!(f, "weekly"),
            Period::Monthly => write!(f, "monthly"),
            Period::Yearly => write!(f, "yearly"),
        }
    }
}

/// Conventions used for one aggregation run. Mixing conventions between calls of the same chart
/// gives misaligned labels, so they travel together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calendar {
    pub week_start: WeekStart,
    pub partition: MonthPartition,
}

impl Calendar {
    pub fn new(week_start: WeekStart, partition: MonthPartition) -> Self {
        Self {
            week_start,
            partition,
        }
    }

    /// Chart of `period` around `reference`. Weekly charts show the week containing `reference`.
    #[instrument(level = "trace", skip(labels, dataset))]
    pub fn chart(
        &self,
        period: Period,
        labels: &LabelTable,
        dataset: &UsageDataset,
        reference: NaiveDate,
    ) -> Chart {
        let chart = match period {
            Period::Weekly => self.week_chart(labels, dataset, reference, 0),
            Period::Monthly => self.month_chart(labels, dataset, reference),
            Period::Yearly => year::year_chart(labels, dataset, reference),
        };
        trace!("Built {period} chart with {} buckets", chart.len());
        chart
    }

    pub fn week_chart(
        &self,
        labels: &LabelTable,
        dataset: &UsageDataset,
        reference: NaiveDate,
        offset_weeks: i64,
    ) -> Chart {
        Chart::new_opt(
            self.week_labels(labels),
            self.week_series(dataset, reference, offset_weeks),
        )
        .expect("Validated label table has a label for every weekday")
    }

    /// Every date covered by the chart of `period`, in order.
    pub fn period_dates(&self, period: Period, reference: NaiveDate) -> Bucket {
        match period {
            Period::Weekly => self.week_buckets(reference, 0),
            Period::Monthly => self.month_week_buckets(reference).concat(),
            Period::Yearly => year::year_month_buckets(reference).concat(),
        }
    }

    pub fn month_chart(
        &self,
        labels: &LabelTable,
        dataset: &UsageDataset,
        reference: NaiveDate,
    ) -> Chart {
        Chart::new_opt(
            self.month_week_labels(labels, reference),
            self.month_week_series(dataset, reference),
        )
        .expect("Month labels are generated per bucket")
    }
}

/// Labels paired with values, one per bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    labels: Vec<String>,
    values: Vec<u64>,
}

impl Chart {
    /// Returns `None` if there isn't exactly one label per value.
    pub fn new_opt(labels: Vec<String>, values: Vec<u64>) -> Option<Self> {
        if labels.len() == values.len() {
            Some(Self { labels, values })
        } else {
            None
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
