use std::fmt::Display;

use anyhow::Result;
use chrono::NaiveDate;
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use crate::utils::{clock::Clock, time::key_to_date};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct ReferenceArgs {
    #[arg(
        long = "date",
        short = 'd',
        global = true,
        help = "Day the charts are built around. Examples are \"yesterday\", \"2024-01-03\", \"15/03/2025\". Defaults to today"
    )]
    date: Option<String>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl ReferenceArgs {
    pub fn new(date: Option<String>, date_style: DateStyle) -> Self {
        Self { date, date_style }
    }

    /// Resolves the reference date, today unless `--date` was given.
    pub fn resolve(&self, clock: &impl Clock) -> Result<NaiveDate> {
        match &self.date {
            Some(date) => self.parse(date, clock),
            None => Ok(clock.now().date_naive()),
        }
    }

    /// `YYYY-MM-DD` is always accepted, anything else goes through natural language parsing
    /// relative to `clock` using the configured date style.
    pub fn parse(&self, date: &str, clock: &impl Clock) -> Result<NaiveDate> {
        if let Some(date) = key_to_date(date.trim()) {
            return Ok(date);
        }
        match parse_date_string(date, clock.now(), self.date_style.into()) {
            Ok(v) => Ok(v.date_naive()),
            Err(e) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate date {date:?}: {e}"),
                )
                .into()),
        }
    }
}
