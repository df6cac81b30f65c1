//! Persisted graph things: resources, classes, predicates, literals and lists.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContributorId, ObservatoryId, OrganizationId};

/// Opaque id of a persisted thing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThingId(String);

impl ThingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThingId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ThingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind tag of a thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThingKind {
    Resource,
    Class,
    Predicate,
    Literal,
    List,
}

impl fmt::Display for ThingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThingKind::Resource => "resource",
            ThingKind::Class => "class",
            ThingKind::Predicate => "predicate",
            ThingKind::Literal => "literal",
            ThingKind::List => "list",
        };
        f.write_str(name)
    }
}

/// How the content of a resource was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionMethod {
    Manual,
    Automatic,
    #[default]
    Unknown,
}

/// Provenance attached to created resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_id: Option<ContributorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observatory_id: Option<ObservatoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub classes: BTreeSet<ThingId>,
    #[serde(default)]
    pub metadata: ResourceMetadata,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    pub fn has_class(&self, class: &ThingId) -> bool {
        self.classes.contains(class)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: ThingId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub id: ThingId,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub id: ThingId,
    pub label: String,
    pub datatype: String,
    pub created_at: DateTime<Utc>,
}

/// Ordered list of thing ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphList {
    pub id: ThingId,
    pub label: String,
    #[serde(default)]
    pub elements: Vec<ThingId>,
    pub created_at: DateTime<Utc>,
}

/// Any persisted thing, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Thing {
    Resource(Resource),
    Class(Class),
    Predicate(Predicate),
    Literal(Literal),
    List(GraphList),
}

impl Thing {
    pub fn id(&self) -> &ThingId {
        match self {
            Thing::Resource(r) => &r.id,
            Thing::Class(c) => &c.id,
            Thing::Predicate(p) => &p.id,
            Thing::Literal(l) => &l.id,
            Thing::List(l) => &l.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Thing::Resource(r) => &r.label,
            Thing::Class(c) => &c.label,
            Thing::Predicate(p) => &p.label,
            Thing::Literal(l) => &l.label,
            Thing::List(l) => &l.label,
        }
    }

    pub fn kind(&self) -> ThingKind {
        match self {
            Thing::Resource(_) => ThingKind::Resource,
            Thing::Class(_) => ThingKind::Class,
            Thing::Predicate(_) => ThingKind::Predicate,
            Thing::Literal(_) => ThingKind::Literal,
            Thing::List(_) => ThingKind::List,
        }
    }
}
