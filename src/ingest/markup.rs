// src/ingest/markup.rs
//! Best-effort RSS/Atom scraper.
//!
//! Works on raw text: `<item>` and `<entry>` blocks are located with
//! non-greedy, case-insensitive patterns and each field is the first match of
//! its tag inside the block. Nothing here returns an error; broken markup just
//! yields fewer entries.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::ingest::types::RawEntry;

static RE_RSS_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<item(?:\s[^>]*)?>(.*?)</item\s*>").expect("rss item regex"));
static RE_ATOM_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<entry(?:\s[^>]*)?>(.*?)</entry\s*>").expect("atom entry regex")
});
static RE_CDATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("cdata regex"));
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));
static RE_LINK_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<link\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#).expect("link href regex")
});

const FIELD_TAGS: &[&str] = &[
    "title",
    "link",
    "guid",
    "pubDate",
    "dc:date",
    "description",
    "id",
    "updated",
    "published",
    "summary",
    "content",
];

// Opening tag may carry attributes but must not be self-closing.
static RE_FIELDS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    FIELD_TAGS
        .iter()
        .map(|&tag| {
            let t = regex::escape(tag);
            let pattern = format!(r"(?is)<{t}(?:\s[^>]*[^/>])?\s*>(.*?)</{t}\s*>");
            (tag, Regex::new(&pattern).expect("field regex"))
        })
        .collect()
});

/// Parse every RSS `<item>` and Atom `<entry>` in `xml`, RSS first.
/// Entries with neither a title nor a link are dropped.
pub fn parse_feed(xml: &str) -> Vec<RawEntry> {
    let rss = RE_RSS_ITEM
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .map(|m| parse_rss_block(m.as_str()));
    let atom = RE_ATOM_ENTRY
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .map(|m| parse_atom_block(m.as_str()));

    rss.chain(atom)
        .filter(|e| e.title.is_some() || e.link.is_some())
        .collect()
}

fn parse_rss_block(block: &str) -> RawEntry {
    let link = extract_tag(block, "link")
        .or_else(|| extract_tag(block, "guid").filter(|g| g.starts_with("http")));
    RawEntry {
        title: extract_tag(block, "title"),
        link,
        published: extract_tag(block, "pubDate").or_else(|| extract_tag(block, "dc:date")),
        summary: extract_tag(block, "description"),
    }
}

fn parse_atom_block(block: &str) -> RawEntry {
    RawEntry {
        title: extract_tag(block, "title"),
        link: link_href(block).or_else(|| extract_tag(block, "id")),
        published: extract_tag(block, "updated").or_else(|| extract_tag(block, "published")),
        summary: extract_tag(block, "summary").or_else(|| extract_tag(block, "content")),
    }
}

/// Text of the first `<tag>...</tag>` in `block`, cleaned. `None` when the tag
/// is missing or its cleaned text is empty.
pub fn extract_tag(block: &str, tag: &str) -> Option<String> {
    let owned;
    let re = match RE_FIELDS.get(tag) {
        Some(re) => re,
        None => {
            let t = regex::escape(tag);
            owned = Regex::new(&format!(r"(?is)<{t}(?:\s[^>]*[^/>])?\s*>(.*?)</{t}\s*>")).ok()?;
            &owned
        }
    };
    let inner = re.captures(block)?.get(1)?.as_str();
    let text = strip_and_decode(inner);
    (!text.is_empty()).then_some(text)
}

/// Unwrap CDATA, strip tags, decode entities, collapse whitespace.
/// Escaped markup stays as literal text after decoding.
pub fn strip_and_decode(s: &str) -> String {
    let unwrapped = RE_CDATA.replace_all(s, "$1");
    let stripped = RE_TAGS.replace_all(&unwrapped, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    RE_WS.replace_all(&decoded, " ").trim().to_string()
}

/// `href` of the first `<link>` element carrying one.
fn link_href(block: &str) -> Option<String> {
    link_href_xml(block).or_else(|| {
        RE_LINK_HREF
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| html_escape::decode_html_entities(m.as_str().trim()).into_owned())
            .filter(|s| !s.is_empty())
    })
}

fn link_href_xml(block: &str) -> Option<String> {
    let mut reader = Reader::from_str(block);
    reader.config_mut().check_end_names = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if !e.local_name().as_ref().eq_ignore_ascii_case(b"link") {
                    continue;
                }
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref().eq_ignore_ascii_case(b"href") {
                        let value = attr.unescape_value().ok()?;
                        let href = value.trim();
                        if !href.is_empty() {
                            return Some(href.to_string());
                        }
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}
