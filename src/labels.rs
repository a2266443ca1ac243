//! Axis labels for the charts. Labels are plain configuration so the date math never has to know
//! which language the dashboard is displayed in.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::WeekStart;

const WEEK_NUMBER_PLACEHOLDER: &str = "{n}";

/// Always holds 7 weekday labels and 12 month labels. Construction goes through validation so the
/// charts can rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLabelTable")]
pub struct LabelTable {
    /// Monday first, regardless of the week start used for bucketing.
    weekdays: Vec<String>,
    months: Vec<String>,
    /// Template for the weeks of a month. `{n}` is replaced with the 1-based week number.
    week_template: String,
}

#[derive(Deserialize)]
struct RawLabelTable {
    weekdays: Vec<String>,
    months: Vec<String>,
    week_template: String,
}

impl TryFrom<RawLabelTable> for LabelTable {
    type Error = anyhow::Error;

    fn try_from(
        RawLabelTable {
            weekdays,
            months,
            week_template,
        }: RawLabelTable,
    ) -> Result<Self> {
        LabelTable::new(weekdays, months, week_template)
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for LabelTable {
    fn default() -> Self {
        Self {
            weekdays: owned(&["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]),
            months: owned(&[
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
            week_template: format!("Week {WEEK_NUMBER_PLACEHOLDER}"),
        }
    }
}

impl LabelTable {
    pub fn new(weekdays: Vec<String>, months: Vec<String>, week_template: String) -> Result<Self> {
        let table = Self {
            weekdays,
            months,
            week_template,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_str(value: &str) -> Result<Self> {
        serde_json::from_str(value).context("Invalid label table")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read label table {path:?}"))?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.weekdays.len() == 7,
            "Label table needs 7 weekday labels, got {}",
            self.weekdays.len()
        );
        ensure!(
            self.months.len() == 12,
            "Label table needs 12 month labels, got {}",
            self.months.len()
        );
        ensure!(
            self.week_template.contains(WEEK_NUMBER_PLACEHOLDER),
            "Week template {:?} doesn't contain {WEEK_NUMBER_PLACEHOLDER}",
            self.week_template
        );
        Ok(())
    }

    pub fn months(&self) -> &[String] {
        &self.months
    }

    /// Weekday labels in bucket order for the given week start.
    pub fn weekdays_from(&self, start: WeekStart) -> Vec<String> {
        let mut labels = self.weekdays.clone();
        labels.rotate_left(start.weekday().num_days_from_monday() as usize);
        labels
    }

    pub fn week_of_month(&self, number: usize) -> String {
        self.week_template
            .replace(WEEK_NUMBER_PLACEHOLDER, &number.to_string())
    }
}
