//! Clock injection
//!
//! Age rules depend on "today", so the current time is always read through a
//! [`mockable::Clock`] handed in by the caller instead of `Utc::now()`.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;

/// Clock shared between the service and request handlers.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Production clock backed by the system time.
pub fn system_clock() -> SharedClock {
    Arc::new(mockable::DefaultClock)
}

/// Calendar date (UTC) the clock currently reports.
pub fn today(clock: &dyn Clock) -> NaiveDate {
    clock.utc().date_naive()
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Clock frozen at midday UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self::new(date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc())
    }

    pub fn shared(self) -> SharedClock {
        Arc::new(self)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now
    }
}
