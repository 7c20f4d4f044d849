//! Identifier helpers for application level keys.

use chrono::{DateTime, Local, TimeZone};

/// Default length of a [`uid`].
pub const UID_LENGTH: usize = 20;

/// Returns a time ordered numeric identifier truncated to `length` digits.
///
/// The digits are the local timestamp (`YYYYmmddHHMMSS`), eight fractional second digits
/// and twelve random digits, so any length up to 34 keeps lexical order by creation time.
pub fn uid(length: usize) -> String {
    uid_at(&Local::now(), length)
}

fn uid_at<Tz: TimeZone>(now: &DateTime<Tz>, length: usize) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let random: u64 = rand::random_range(100_000_000_000..=999_999_999_999);
    let mut id = format!(
        "{}{:06}00{}",
        now.format("%Y%m%d%H%M%S"),
        now.timestamp_subsec_micros(),
        random
    );
    id.truncate(length);
    id
}

/// Returns a random version 4 UUID in its hyphenated lowercase form.
pub fn uuid() -> String {
    uuid::Uuid::new_v4().hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_uid_layout() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let id = uid_at(&now, 34);

        assert_eq!(id.len(), 34);
        assert!(id.starts_with("20240309070501"));
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_uid_truncates() {
        assert_eq!(uid(UID_LENGTH).len(), UID_LENGTH);
        assert_eq!(uid(8).len(), 8);
        assert!(uid(0).is_empty());
    }

    #[test]
    fn test_uuid_v4() {
        let a = uuid();
        let b = uuid();

        assert_eq!(a.len(), 36);
        assert_eq!(a.as_bytes()[14], b'4');
        assert!(matches!(a.as_bytes()[19], b'8' | b'9' | b'a' | b'b'));
        assert_ne!(a, b);
    }
}
