//! SAS date arithmetic.

use chrono::{Days, NaiveDate};

/// Day zero of SAS date values
pub const SAS_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1960, 1, 1) {
    Some(date) => date,
    None => panic!("invalid SAS epoch"),
};

/// Add a signed day count to `epoch`; `None` when the result leaves chrono's range
#[must_use]
pub fn date_from_offset(epoch: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        epoch.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// ISO-8601 date for a SAS day offset; fractional days are truncated
#[must_use]
pub fn sas_date_to_iso(offset: f64) -> Option<String> {
    if !offset.is_finite() {
        return None;
    }
    let days = offset.trunc();
    if days.abs() > f64::from(i32::MAX) {
        return None;
    }
    date_from_offset(SAS_EPOCH, days as i64).map(|d| d.format("%Y-%m-%d").to_string())
}
