use chrono::{Datelike, Duration, Months, NaiveDate};

const KEY_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a dataset key in usagechart.
pub fn date_to_key(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

/// Reverse of [date_to_key]. Returns `None` for anything that isn't a `YYYY-MM-DD` date.
pub fn key_to_date(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, KEY_FORMAT).ok()
}

/// Moves a date by a signed amount of days.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .expect("End of time should never happen")
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("Every month has a first day")
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let start = month_start(date);
    let next = start
        .checked_add_months(Months::new(1))
        .expect("End of time should never happen");
    (next - start).num_days() as u32
}

/// Returns every date of the month containing `date`, starting from the 1st.
pub fn month_days(date: NaiveDate) -> Vec<NaiveDate> {
    month_start(date)
        .iter_days()
        .take(days_in_month(date) as usize)
        .collect()
}
