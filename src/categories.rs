// src/categories.rs
//! Static category table and the keyword/source classifier.
//!
//! - `CATEGORIES` is the single, immutable source of ids, titles and search
//!   queries.
//! - Predicates are keyed by id; unknown ids fall back to a generic threat
//!   vocabulary.
//! - Matching runs case-insensitively over `title + " " + summary`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ingest::types::Item;

/// One topical bucket of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryConfig {
    pub id: &'static str,
    pub title: &'static str,
    /// Search-API path only; the feed path classifies instead.
    pub queries: &'static [&'static str],
}

pub static CATEGORIES: &[CategoryConfig] = &[
    CategoryConfig {
        id: "cyberforsvaret_social",
        title: "Cyberforsvaret: social mentions",
        queries: &[
            "Cyberforsvaret",
            "\"Norwegian Armed Forces Cyber Defence\"",
            "#cyberforsvaret",
        ],
    },
    CategoryConfig {
        id: "cyberforsvaret_media",
        title: "Cyberforsvaret: national media",
        queries: &[
            "Cyberforsvaret site:nrk.no OR site:vg.no OR site:aftenposten.no",
            "Cyberforsvaret site:digi.no OR site:forsvaretsforum.no",
        ],
    },
    CategoryConfig {
        id: "milno_targeting",
        title: "Targeting of mil.no / Armed Forces",
        queries: &[
            "mil.no DDoS",
            "Forsvaret dataangrep",
            "Norwegian Armed Forces cyber attack",
        ],
    },
    CategoryConfig {
        id: "norway_incidents",
        title: "Norwegian cyber incidents",
        queries: &["NSM sikkerhetshendelse", "datainnbrudd Norge", "NorCERT varsel"],
    },
    CategoryConfig {
        id: "global_threats",
        title: "Global threat landscape",
        queries: &["ransomware attack", "CISA advisory vulnerability", "DDoS campaign"],
    },
];

/// Lookup by id.
pub fn category(id: &str) -> Option<&'static CategoryConfig> {
    CATEGORIES.iter().find(|c| c.id == id)
}

const MEDIA_HOSTS: &[&str] = &[
    "nrk.no",
    "vg.no",
    "aftenposten.no",
    "dagbladet.no",
    "dn.no",
    "e24.no",
    "tv2.no",
    "digi.no",
    "forsvaretsforum.no",
    "abcnyheter.no",
    "nettavisen.no",
];

// Stems stay open on the right: Norwegian genitive and definite forms
// ("Cyberforsvarets", "Forsvarets") must still match.
static RE_CYBERFORSVARET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bcyber\s*forsvar\w*|\bcyber[\s-]*defen[cs]e\b")
        .expect("cyberforsvaret regex")
});
static RE_ARMED_FORCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bmil\.no\b|\bforsvaret\w*(?:\.no)?|\barmed\s+forces\b")
        .expect("armed forces regex")
});
static RE_ATTACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bddos\b|\bangrep\w*|\battack\w*|\bphishing\b|\bhack\w*|\btargeted\b|\bmålrettet\b|\blekkasje\w*|\bleak\w*|\bbreach\w*",
    )
    .expect("attack regex")
});
static RE_NORWAY_INCIDENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bnsm\b|nasjonal\s+sikkerhetsmyndighet|\bnorcert\b|datainnbrudd|dataangrep|løsepengevirus|cyberangrep|sikkerhetshendelse",
    )
    .expect("norway incidents regex")
});
static RE_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)ransomware|\bddos\b|vulnerabilit(?:y|ies)|sårbarhet\w*|intrusion|breach\w*|\bcisa\b|\bcert\b",
    )
    .expect("default category regex")
});

/// True when `source` is one of the media hosts or a subdomain of one.
pub fn is_national_media(source: &str) -> bool {
    let s = source.trim().to_ascii_lowercase();
    MEDIA_HOSTS
        .iter()
        .any(|h| s == *h || s.strip_suffix(h).is_some_and(|rest| rest.ends_with('.')))
}

fn haystack(item: &Item) -> String {
    format!(
        "{} {}",
        item.title.as_deref().unwrap_or_default(),
        item.summary.as_deref().unwrap_or_default()
    )
}

/// Membership test for one category id.
pub fn matches_category(item: &Item, category_id: &str) -> bool {
    let text = haystack(item);
    match category_id {
        "cyberforsvaret_social" => RE_CYBERFORSVARET.is_match(&text),
        "cyberforsvaret_media" => {
            RE_CYBERFORSVARET.is_match(&text) && is_national_media(&item.source)
        }
        "milno_targeting" => RE_ARMED_FORCES.is_match(&text) && RE_ATTACK.is_match(&text),
        "norway_incidents" => RE_NORWAY_INCIDENTS.is_match(&text),
        _ => RE_DEFAULT.is_match(&text),
    }
}

/// Ids (in table order) of every category the item belongs to.
pub fn classify(item: &Item, categories: &[CategoryConfig]) -> Vec<&'static str> {
    categories
        .iter()
        .filter(|c| matches_category(item, c.id))
        .map(|c| c.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, summary: Option<&str>, source: &str) -> Item {
        Item {
            title: Some(title.into()),
            url: "https://x.test/a".into(),
            source: source.into(),
            published_at: None,
            tags: vec![],
            summary: summary.map(str::to_string),
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = CATEGORIES.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CATEGORIES.len());
        assert_eq!(
            category("milno_targeting").map(|c| c.title),
            Some("Targeting of mil.no / Armed Forces")
        );
        assert!(category("nope").is_none());
    }

    #[test]
    fn cyber_defence_statement_is_social_not_targeting() {
        let it = item("Norwegian Armed Forces Cyber Defence statement", None, "x.com");
        assert!(matches_category(&it, "cyberforsvaret_social"));
        assert!(!matches_category(&it, "milno_targeting"));
    }

    #[test]
    fn media_requires_keyword_and_source() {
        let on_nrk = item("Cyberforsvaret øver", None, "nrk.no");
        let on_blog = item("Cyberforsvaret øver", None, "someblog.net");
        let off_topic = item("Værmelding", None, "nrk.no");
        assert!(matches_category(&on_nrk, "cyberforsvaret_media"));
        assert!(!matches_category(&on_blog, "cyberforsvaret_media"));
        assert!(!matches_category(&off_topic, "cyberforsvaret_media"));
    }

    #[test]
    fn media_hosts_accept_subdomains_only() {
        assert!(is_national_media("NRK.no"));
        assert!(is_national_media("e24.no"));
        assert!(is_national_media("m.vg.no"));
        assert!(!is_national_media("notvg.no"));
    }

    #[test]
    fn targeting_needs_both_terms() {
        let hit = item("DDoS-angrep mot mil.no", None, "x");
        let no_attack = item("Forsvaret kjøper fly", None, "x");
        assert!(matches_category(&hit, "milno_targeting"));
        assert!(!matches_category(&no_attack, "milno_targeting"));
    }

    #[test]
    fn genitive_forms_match() {
        let chief = item("Cyberforsvarets sjef advarer", None, "x");
        assert!(matches_category(&chief, "cyberforsvaret_social"));
        let on_nrk = item("Cyberforsvarets øvelse", None, "nrk.no");
        assert!(matches_category(&on_nrk, "cyberforsvaret_media"));
        let ddos = item("DDoS-angrep mot Forsvarets nettsider", None, "x");
        assert!(matches_category(&ddos, "milno_targeting"));
        let site = item("Phishing rettet mot forsvaret.no", None, "x");
        assert!(matches_category(&site, "milno_targeting"));
    }

    #[test]
    fn unknown_id_uses_default_vocabulary() {
        let it = item("New advisory", Some("CISA warns about a VULNERABILITY"), "x");
        assert!(matches_category(&it, "global_threats"));
        assert!(matches_category(&it, "anything_else"));
        let norsk = item("Kritisk sårbarhet i ruter", None, "x");
        assert!(matches_category(&norsk, "global_threats"));
        let calm = item("Concert review", None, "x");
        assert!(!matches_category(&calm, "global_threats"));
    }

    #[test]
    fn classification_is_not_exclusive() {
        let it = item("Cyberforsvaret: DDoS attack on mil.no", None, "nrk.no");
        let ids = classify(&it, CATEGORIES);
        assert_eq!(
            ids,
            vec![
                "cyberforsvaret_social",
                "cyberforsvaret_media",
                "milno_targeting",
                "global_threats"
            ]
        );
    }
}
