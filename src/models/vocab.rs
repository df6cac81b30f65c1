//! Built-in vocabulary the pipeline links against.
//!
//! These ids must exist in the store before a paper can be created;
//! [`MemoryGraph::seeded`](crate::repositories::MemoryGraph::seeded) installs them.

pub mod classes {
    pub const PAPER: &str = "Paper";
    pub const CONTRIBUTION: &str = "Contribution";
    pub const AUTHOR: &str = "Author";
    pub const RESEARCH_FIELD: &str = "ResearchField";
    pub const VENUE: &str = "Venue";
    pub const PROBLEM: &str = "Problem";

    // Kinds that a user-defined resource must never claim as a class.
    pub const THING: &str = "Thing";
    pub const RESOURCE: &str = "Resource";
    pub const CLASS: &str = "Class";
    pub const PREDICATE: &str = "Predicate";
    pub const LITERAL: &str = "Literal";
    pub const LIST: &str = "List";

    pub const RESERVED: &[&str] = &[THING, RESOURCE, CLASS, PREDICATE, LITERAL, LIST];

    /// Classes installed in a fresh store, with their labels.
    pub const BUILT_IN: &[(&str, &str)] = &[
        (PAPER, "Paper"),
        (CONTRIBUTION, "Contribution"),
        (AUTHOR, "Author"),
        (RESEARCH_FIELD, "Research Field"),
        (VENUE, "Venue"),
        (PROBLEM, "Problem"),
    ];
}

pub mod predicates {
    pub const HAS_CONTRIBUTION: &str = "P31";
    pub const HAS_RESEARCH_FIELD: &str = "P30";
    pub const HAS_DOI: &str = "P26";
    pub const MONTH_PUBLISHED: &str = "P28";
    pub const YEAR_PUBLISHED: &str = "P29";
    pub const HAS_RESEARCH_PROBLEM: &str = "P32";
    pub const HAS_AUTHORS: &str = "hasAuthors";
    pub const HAS_VENUE: &str = "HAS_VENUE";
    pub const HAS_URL: &str = "url";
    pub const HAS_WEBSITE: &str = "website";
    pub const DESCRIPTION: &str = "description";
    pub const HAS_ORCID: &str = "HAS_ORCID";
    pub const HAS_GOOGLE_SCHOLAR_ID: &str = "googleScholarID";
    pub const HAS_RESEARCH_GATE_ID: &str = "researchGateID";
    pub const HAS_LINKED_IN_ID: &str = "linkedInID";
    pub const HAS_WIKIDATA_ID: &str = "P76020";
    pub const HAS_WEB_OF_SCIENCE_ID: &str = "P58083";
    pub const HAS_EVALUATION: &str = "HAS_EVALUATION";

    pub const BUILT_IN: &[(&str, &str)] = &[
        (HAS_CONTRIBUTION, "has contribution"),
        (HAS_RESEARCH_FIELD, "has research field"),
        (HAS_DOI, "has DOI"),
        (MONTH_PUBLISHED, "has publication month"),
        (YEAR_PUBLISHED, "has publication year"),
        (HAS_RESEARCH_PROBLEM, "has research problem"),
        (HAS_AUTHORS, "has authors"),
        (HAS_VENUE, "has venue"),
        (HAS_URL, "has url"),
        (HAS_WEBSITE, "website"),
        (DESCRIPTION, "description"),
        (HAS_ORCID, "has ORCID"),
        (HAS_GOOGLE_SCHOLAR_ID, "has Google Scholar ID"),
        (HAS_RESEARCH_GATE_ID, "has ResearchGate ID"),
        (HAS_LINKED_IN_ID, "has LinkedIn ID"),
        (HAS_WIKIDATA_ID, "has Wikidata ID"),
        (HAS_WEB_OF_SCIENCE_ID, "has Web of Science ID"),
        (HAS_EVALUATION, "has evaluation"),
    ];
}

pub mod datatypes {
    pub const STRING: &str = "xsd:string";
    pub const INTEGER: &str = "xsd:integer";
    pub const INT: &str = "xsd:int";
    pub const LONG: &str = "xsd:long";
    pub const DECIMAL: &str = "xsd:decimal";
    pub const FLOAT: &str = "xsd:float";
    pub const DOUBLE: &str = "xsd:double";
    pub const BOOLEAN: &str = "xsd:boolean";
    pub const ANY_URI: &str = "xsd:anyURI";
}

/// Label of the list linking a paper to its authors.
pub const AUTHORS_LIST_LABEL: &str = "authors list";
