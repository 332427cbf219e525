use chrono::NaiveDate;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;
use crate::domain::subscriber_timezone::SubscriberTimezone;

/// A newsletter subscriber as read back from the store.
///
/// `last_sent_date` is a calendar date scoped to the subscriber's own
/// timezone. It is only ever written after a confirmed delivery, and it is the
/// marker that makes repeated dispatch runs idempotent within one local day.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Subscriber {
    pub email: SubscriberEmail,
    pub name: SubscriberName,
    pub timezone: SubscriberTimezone,
    pub last_sent_date: Option<NaiveDate>,
}
