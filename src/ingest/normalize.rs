// src/ingest/normalize.rs
//! Folding raw feed entries and search hits into [`Item`].

use reqwest::Url;

use crate::ingest::markup::strip_and_decode;
use crate::ingest::types::{Item, RawEntry, SearchHit};

/// Label used when no feed label is given and the URL has no usable host.
pub const UNKNOWN_SOURCE: &str = "unknown source";

/// Hostname of `url` without a leading `www.`, or `None` if it cannot be parsed.
pub fn safe_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    (!host.is_empty()).then(|| host.to_string())
}

/// Explicit label > URL host > [`UNKNOWN_SOURCE`].
pub fn resolve_source(label: Option<&str>, url: &str) -> String {
    label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .or_else(|| safe_host(url))
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// Feed entry → Item. Entries without a link are not addressable and yield `None`.
pub fn item_from_entry(entry: RawEntry, label: Option<&str>) -> Option<Item> {
    let url = entry.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())?;
    Some(Item {
        source: resolve_source(label, &url),
        title: entry.title,
        url,
        published_at: entry.published,
        tags: Vec::new(),
        summary: entry.summary,
    })
}

/// Search hit → Item. Title falls back to the URL.
pub fn item_from_hit(hit: &SearchHit) -> Option<Item> {
    let url = hit.target()?.to_string();
    let title = hit
        .title
        .as_deref()
        .map(strip_and_decode)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.clone());
    let summary = hit.blurb().map(strip_and_decode).filter(|s| !s.is_empty());
    Some(Item {
        source: resolve_source(None, &url),
        title: Some(title),
        url,
        published_at: hit.timestamp().map(str::to_string),
        tags: Vec::new(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_strips_www() {
        assert_eq!(safe_host("https://www.example.com/a").as_deref(), Some("example.com"));
        assert_eq!(safe_host("https://nrk.no/x?y=1").as_deref(), Some("nrk.no"));
    }

    #[test]
    fn unparseable_url_falls_back_to_sentinel() {
        assert_eq!(safe_host("not a url"), None);
        assert_eq!(resolve_source(None, "::::"), "unknown source");
        assert_eq!(resolve_source(Some("   "), "mailto:x@y.z"), UNKNOWN_SOURCE);
    }

    #[test]
    fn label_wins_over_host() {
        assert_eq!(resolve_source(Some("NSM"), "https://www.nsm.no/rss"), "NSM");
    }

    #[test]
    fn entry_without_link_is_dropped() {
        let e = RawEntry {
            title: Some("t".into()),
            ..Default::default()
        };
        assert!(item_from_entry(e, Some("x")).is_none());
    }

    #[test]
    fn hit_title_defaults_to_url() {
        let hit = SearchHit {
            url: Some("https://www.vg.no/nyheter/1".into()),
            published_at: Some("".into()),
            ..Default::default()
        };
        let item = item_from_hit(&hit).unwrap();
        assert_eq!(item.title.as_deref(), Some("https://www.vg.no/nyheter/1"));
        assert_eq!(item.source, "vg.no");
        assert_eq!(item.published_at, None);
        assert!(item.tags.is_empty());
    }

    #[test]
    fn hit_field_spellings_merge_in_order() {
        let hit = SearchHit {
            title: Some("Cyberforsvaret &amp; NSM".into()),
            url: Some(" ".into()),
            link: Some("https://nrk.no/a".into()),
            published_at: None,
            date: Some("2024-05-01".into()),
            published: Some("2020-01-01".into()),
            snippet: Some("<b>kort</b> tekst".into()),
            description: Some("ignored".into()),
            ..Default::default()
        };
        let item = item_from_hit(&hit).unwrap();
        assert_eq!(item.url, "https://nrk.no/a");
        assert_eq!(item.title.as_deref(), Some("Cyberforsvaret & NSM"));
        assert_eq!(item.published_at.as_deref(), Some("2024-05-01"));
        assert_eq!(item.summary.as_deref(), Some("kort tekst"));
    }

    #[test]
    fn hit_without_any_url_is_dropped() {
        let hit = SearchHit {
            title: Some("t".into()),
            ..Default::default()
        };
        assert!(item_from_hit(&hit).is_none());
    }
}
