use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Briefings go out Monday morning, subscriber-local time.
pub const DELIVERY_WEEKDAY: Weekday = Weekday::Mon;
pub const DELIVERY_HOUR: u32 = 9;

/// The per-subscriber gate decision for one run.
///
/// `local_date` is the date that gets stamped on the subscriber after a
/// confirmed send, so a later run within the same local day sees
/// `already_sent_today` and skips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    pub send_now: bool,
    pub local_date: NaiveDate,
    pub local_weekday: Weekday,
    pub local_hour: u32,
}

/// Evaluates the delivery gate for a single subscriber.
///
/// `now` is the instant captured once at run start; the window is computed
/// against the subscriber's own civil calendar, so two subscribers can fall on
/// different weekdays for the identical instant. `force` bypasses both the
/// window and the already-sent check and is only used for manual runs.
pub fn evaluate(
    now: DateTime<Utc>,
    timezone: Tz,
    last_sent_date: Option<NaiveDate>,
    force: bool,
) -> Eligibility {
    let local = now.with_timezone(&timezone);
    let local_date = local.date_naive();
    let local_weekday = local.weekday();
    let local_hour = local.hour();

    let in_delivery_window = local_weekday == DELIVERY_WEEKDAY && local_hour >= DELIVERY_HOUR;
    let already_sent_today = last_sent_date == Some(local_date);

    Eligibility {
        send_now: force || (in_delivery_window && !already_sent_today),
        local_date,
        local_weekday,
        local_hour,
    }
}
