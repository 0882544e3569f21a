use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// Every validity month counts as exactly this many days.
pub const DAYS_PER_MONTH: i64 = 30;
pub const STANDARD_VALIDITY_MONTHS: i64 = 6;
pub const BUSINESS_VALIDITY_MONTHS: i64 = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Status {
    Valid,
    Expired,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Valid => f.write_str("Valid"),
            Status::Expired => f.write_str("Expired"),
        }
    }
}

/// Business-related documents stay valid for a year, everything else for six
/// months.
pub fn validity_months(purpose: Option<&str>) -> i64 {
    match purpose {
        Some(purpose) if purpose.to_lowercase().contains("business") => BUSINESS_VALIDITY_MONTHS,
        _ => STANDARD_VALIDITY_MONTHS,
    }
}

/// `None` when the window runs past the last representable date.
pub fn expiry_date(issued: NaiveDate, purpose: Option<&str>) -> Option<NaiveDate> {
    issued.checked_add_signed(Duration::days(validity_months(purpose) * DAYS_PER_MONTH))
}

/// Documents whose expiry cannot be represented never expire.
pub fn derive_status(issued: NaiveDate, purpose: Option<&str>, today: NaiveDate) -> Status {
    match expiry_date(issued, purpose) {
        Some(expiry) if today > expiry => Status::Expired,
        _ => Status::Valid,
    }
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
