use chrono_tz::Tz;

/// An IANA timezone name, e.g. "America/New_York". Delivery windows are
/// evaluated against the subscriber's own civil calendar, so the zone has to
/// resolve against the timezone database rather than a fixed UTC offset.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubscriberTimezone(Tz);

impl SubscriberTimezone {
    pub fn parse(timezone: String) -> Result<SubscriberTimezone, String> {
        timezone
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| format!("{} is not a valid IANA timezone", timezone))
    }

    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl AsRef<str> for SubscriberTimezone {
    fn as_ref(&self) -> &str {
        self.0.name()
    }
}
