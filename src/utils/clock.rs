use chrono::{DateTime, Local};

/// Represents an entity responsible for providing the current time across application. This
/// allows "today" to be pinned during testing.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Local>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
