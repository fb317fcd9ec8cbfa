// src/ingest/recency.rs
//! Time-window filtering. Fail-open: anything we cannot date is kept.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::ingest::types::Item;

const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

const MS_PER_HOUR: f64 = 3_600_000.0;

/// `now - window_hours`, saturating at the earliest representable instant.
/// Fractional hours are honoured to the millisecond.
pub fn cutoff(now: DateTime<Utc>, window_hours: f64) -> DateTime<Utc> {
    // `as` saturates, so absurd windows land on i64::MAX ms.
    let ms = (window_hours * MS_PER_HOUR).round() as i64;
    Duration::try_milliseconds(ms)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse a feed/API timestamp. RFC 3339 and RFC 2822 first, then a few naive
/// layouts read as UTC.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

/// Keep when undated, undatable, or dated at/after `cutoff`.
pub fn is_recent(item: &Item, cutoff: DateTime<Utc>) -> bool {
    match item.published_at.as_deref().and_then(parse_published) {
        Some(ts) => ts >= cutoff,
        None => true,
    }
}

/// Filter in place; returns how many items were dropped as stale.
pub fn retain_recent(items: &mut Vec<Item>, cutoff: DateTime<Utc>) -> usize {
    let before = items.len();
    items.retain(|it| is_recent(it, cutoff));
    before - items.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(published_at: Option<&str>) -> Item {
        Item {
            title: Some("t".into()),
            url: "https://x.test/".into(),
            source: "x.test".into(),
            published_at: published_at.map(str::to_string),
            tags: vec![],
            summary: None,
        }
    }

    #[test]
    fn parses_common_formats() {
        let want = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_published("Mon, 01 Jan 2024 00:00:00 GMT"), Some(want));
        assert_eq!(parse_published("2024-01-01T00:00:00Z"), Some(want));
        assert_eq!(parse_published("2024-01-01T01:00:00+01:00"), Some(want));
        assert_eq!(parse_published("2024-01-01 00:00:00"), Some(want));
        assert_eq!(parse_published("2024-01-01"), Some(want));
        assert_eq!(parse_published("yesterday-ish"), None);
    }

    #[test]
    fn boundary_is_inclusive() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let c = cutoff(now, 24.0);
        assert!(is_recent(&item(Some("2024-01-01T00:00:00Z")), c));
        assert!(!is_recent(&item(Some("2023-12-31T23:59:59Z")), c));
        assert!(is_recent(&item(Some("2024-01-01T12:00:00Z")), c));
    }

    #[test]
    fn huge_window_saturates() {
        assert_eq!(cutoff(Utc::now(), 1e12), DateTime::<Utc>::MIN_UTC);
        assert_eq!(cutoff(Utc::now(), f64::MAX), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn fractional_window_is_exact() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let c = cutoff(now, 1.5);
        assert_eq!(c, Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap());
        assert!(is_recent(&item(Some("2024-01-01T10:30:00Z")), c));
        assert!(!is_recent(&item(Some("2024-01-01T10:29:59Z")), c));
    }

    #[test]
    fn undated_and_garbage_are_kept() {
        let c = cutoff(Utc::now(), 1.0);
        assert!(is_recent(&item(None), c));
        assert!(is_recent(&item(Some("not a date")), c));
        assert!(is_recent(&item(Some("")), c));
    }

    #[test]
    fn retain_counts_stale() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut v = vec![
            item(Some("2020-01-01T00:00:00Z")),
            item(None),
            item(Some("2024-05-31T12:00:00Z")),
        ];
        assert_eq!(retain_recent(&mut v, cutoff(now, 24.0)), 1);
        assert_eq!(v.len(), 2);
    }
}
