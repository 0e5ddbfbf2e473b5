use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

// Fixed three-digit fraction so every timestamp has the same width and
// lexicographic order equals chronological order. Keyset pagination over
// `updated_at` relies on that.
const ISO_MILLIS: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Current UTC timestamp, e.g. `2026-03-01T10:15:30.123Z`.
pub fn now_iso() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(ISO_MILLIS)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00.000Z"))
}

/// True when `value` parses as RFC 3339.
pub fn is_iso(value: &str) -> bool {
    OffsetDateTime::parse(value, &Rfc3339).is_ok()
}

#[cfg(test)]
mod tests {
    use super::{is_iso, now_iso};

    #[test]
    fn now_is_parseable_and_fixed_width() {
        let now = now_iso();
        assert!(is_iso(&now));
        assert!(now.ends_with('Z'));
        assert_eq!(now.len(), "2026-03-01T10:15:30.123Z".len());
    }

    #[test]
    fn iso_strings_sort_chronologically() {
        assert!("2024-01-02T00:00:00.000Z" > "2024-01-01T23:59:59.999Z");
        assert!("2024-01-01T10:00:00.100Z" < "2024-01-01T10:00:00.101Z");
    }
}
