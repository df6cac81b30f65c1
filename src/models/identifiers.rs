//! Identifier kinds recognised on papers and authors.

use once_cell::sync::Lazy;
use regex::Regex;

use super::vocab::predicates;

/// An external identifier kind: the payload key, the predicate linking its
/// literal value, and the accepted value format.
pub struct IdentifierKind {
    pub key: &'static str,
    pub predicate: &'static str,
    pattern: &'static Lazy<Regex>,
}

impl IdentifierKind {
    pub fn is_valid(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

static ORCID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dX]$").expect("orcid pattern"));
static GOOGLE_SCHOLAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-_0-9A-Za-z]{12}$").expect("google scholar pattern"));
static RESEARCH_GATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z_.-]+$").expect("researchgate pattern"));
static LINKED_IN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w-]{3,100}$").expect("linkedin pattern"));
static WIKIDATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Q[1-9]\d*$").expect("wikidata pattern"));
static WEB_OF_SCIENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{1,3}-\d{4}-(19|20)\d\d$").expect("web of science pattern")
});
static DOI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("doi pattern"));

pub static AUTHOR_IDENTIFIERS: &[IdentifierKind] = &[
    IdentifierKind {
        key: "orcid",
        predicate: predicates::HAS_ORCID,
        pattern: &ORCID,
    },
    IdentifierKind {
        key: "google_scholar",
        predicate: predicates::HAS_GOOGLE_SCHOLAR_ID,
        pattern: &GOOGLE_SCHOLAR,
    },
    IdentifierKind {
        key: "research_gate",
        predicate: predicates::HAS_RESEARCH_GATE_ID,
        pattern: &RESEARCH_GATE,
    },
    IdentifierKind {
        key: "linked_in",
        predicate: predicates::HAS_LINKED_IN_ID,
        pattern: &LINKED_IN,
    },
    IdentifierKind {
        key: "wikidata",
        predicate: predicates::HAS_WIKIDATA_ID,
        pattern: &WIKIDATA,
    },
    IdentifierKind {
        key: "web_of_science",
        predicate: predicates::HAS_WEB_OF_SCIENCE_ID,
        pattern: &WEB_OF_SCIENCE,
    },
];

pub static PAPER_IDENTIFIERS: &[IdentifierKind] = &[IdentifierKind {
    key: "doi",
    predicate: predicates::HAS_DOI,
    pattern: &DOI,
}];

/// Looks up a known identifier kind by payload key.
pub fn find_kind<'a>(kinds: &'a [IdentifierKind], key: &str) -> Option<&'a IdentifierKind> {
    kinds.iter().find(|kind| kind.key == key)
}
