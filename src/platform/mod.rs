//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Run seeds
//! - The calendar date used to pick the daily pattern

/// Fresh seed for a new run
#[cfg(target_arch = "wasm32")]
pub fn entropy_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Fresh seed for a new run
#[cfg(not(target_arch = "wasm32"))]
pub fn entropy_seed() -> u64 {
    rand::random::<u64>()
}

/// Today's UTC date as `YYYY-MM-DD`
#[cfg(target_arch = "wasm32")]
pub fn today_date_id() -> String {
    let now = js_sys::Date::new_0();
    format_date_id(
        now.get_utc_full_year() as i64,
        now.get_utc_month() + 1,
        now.get_utc_date(),
    )
}

/// Today's UTC date as `YYYY-MM-DD`
#[cfg(not(target_arch = "wasm32"))]
pub fn today_date_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let secs = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => {
            log::warn!("System clock before Unix epoch: {e}");
            0
        }
    };
    let (y, m, d) = civil_from_days(secs.div_euclid(86_400));
    format_date_id(y, m, d)
}

pub fn format_date_id(year: i64, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

/// Proleptic Gregorian date for a count of days since 1970-01-01
pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
