use axum_extra::headers::{self, Header};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use http::{HeaderName, HeaderValue};

static X_TIMEZONE: HeaderName = HeaderName::from_static("x-timezone");

/// `X-Timezone` request header carrying an IANA zone name for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XTimezone(pub String);

impl Header for XTimezone {
    fn name() -> &'static HeaderName {
        &X_TIMEZONE
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        // Non-ASCII bytes survive lossily and end up as an unknown zone.
        let zone = String::from_utf8_lossy(value.as_bytes());
        Ok(XTimezone(zone.trim().to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Localized {
    pub datetime: DateTime<FixedOffset>,
    /// Set when the zone name was not recognised and UTC was used instead.
    pub warning: Option<String>,
}

/// Converts `instant` into `zone` for display. Never fails: an unknown zone
/// leaves the instant in UTC and reports why.
pub fn localize(instant: DateTime<Utc>, zone: &str) -> Localized {
    match zone.parse::<Tz>() {
        Ok(tz) => Localized {
            datetime: instant.with_timezone(&tz).fixed_offset(),
            warning: None,
        },
        Err(_) => Localized {
            datetime: instant.fixed_offset(),
            warning: Some(format!("Unknown timezone: {zone}, using UTC")),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_localize_known_zone() {
        let instant = Utc.with_ymd_and_hms(2025, 11, 24, 6, 0, 0).unwrap();
        let local = localize(instant, "Asia/Kolkata");
        assert!(local.warning.is_none());
        assert_eq!(local.datetime.to_rfc3339(), "2025-11-24T11:30:00+05:30");
        assert_eq!(local.datetime, instant);
    }

    #[test]
    fn test_localize_handles_dst() {
        let instant = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
        let local = localize(instant, "Europe/Warsaw");
        assert_eq!(local.datetime.to_rfc3339(), "2025-07-01T14:00:00+02:00");
    }

    #[test]
    fn test_localize_unknown_zone_falls_back() {
        let instant = Utc.with_ymd_and_hms(2025, 11, 24, 6, 0, 0).unwrap();
        let local = localize(instant, "Mars/Olympus_Mons");
        assert!(local.warning.is_some());
        assert_eq!(local.datetime.to_rfc3339(), "2025-11-24T06:00:00+00:00");
    }

    #[test]
    fn test_decode_header() {
        let value = HeaderValue::from_static(" UTC ");
        let decoded = XTimezone::decode(&mut std::iter::once(&value)).unwrap();
        assert_eq!(decoded, XTimezone("UTC".to_string()));
    }

    #[test]
    fn test_decode_non_ascii_header() {
        let value = HeaderValue::from_bytes("Europe/Zürich".as_bytes()).unwrap();
        let decoded = XTimezone::decode(&mut std::iter::once(&value)).unwrap();
        assert!(decoded.0.starts_with("Europe/Z"));
        assert!(localize(Utc::now(), &decoded.0).warning.is_some());
    }
}
