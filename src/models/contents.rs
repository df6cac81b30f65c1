//! Payload definitions of new things and contribution statement trees.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::vocab::datatypes;
use super::ThingId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub label: String,
    #[serde(default)]
    pub classes: BTreeSet<ThingId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralDefinition {
    pub label: String,
    #[serde(default = "default_datatype")]
    pub data_type: String,
}

fn default_datatype() -> String {
    datatypes::STRING.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateDefinition {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A list whose elements are placeholders or real ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDefinition {
    pub label: String,
    #[serde(default)]
    pub elements: Vec<String>,
}

/// One definition, tagged by the kind of thing it will create.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThingDefinition<'a> {
    Literal(&'a LiteralDefinition),
    Predicate(&'a PredicateDefinition),
    Resource(&'a ResourceDefinition),
    List(&'a ListDefinition),
}

impl ThingDefinition<'_> {
    pub fn label(&self) -> &str {
        match self {
            ThingDefinition::Literal(d) => &d.label,
            ThingDefinition::Predicate(d) => &d.label,
            ThingDefinition::Resource(d) => &d.label,
            ThingDefinition::List(d) => &d.label,
        }
    }
}

/// Things to create, keyed by placeholder id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThingDefinitions {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDefinition>,
    #[serde(default)]
    pub literals: BTreeMap<String, LiteralDefinition>,
    #[serde(default)]
    pub predicates: BTreeMap<String, PredicateDefinition>,
    #[serde(default)]
    pub lists: BTreeMap<String, ListDefinition>,
}

impl ThingDefinitions {
    /// Every declared placeholder, once per map it appears in.
    pub fn declared_temp_ids(&self) -> impl Iterator<Item = &str> {
        self.resources
            .keys()
            .chain(self.literals.keys())
            .chain(self.predicates.keys())
            .chain(self.lists.keys())
            .map(String::as_str)
    }

    /// Definitions in dependency-safe creation order: literals, predicates,
    /// resources, then lists (which may reference all of the others).
    pub fn in_creation_order(&self) -> impl Iterator<Item = (&str, ThingDefinition<'_>)> {
        let literals = self
            .literals
            .iter()
            .map(|(k, d)| (k.as_str(), ThingDefinition::Literal(d)));
        let predicates = self
            .predicates
            .iter()
            .map(|(k, d)| (k.as_str(), ThingDefinition::Predicate(d)));
        let resources = self
            .resources
            .iter()
            .map(|(k, d)| (k.as_str(), ThingDefinition::Resource(d)));
        let lists = self
            .lists
            .iter()
            .map(|(k, d)| (k.as_str(), ThingDefinition::List(d)));

        literals.chain(predicates).chain(resources).chain(lists)
    }

    pub fn is_literal(&self, temp_id: &str) -> bool {
        self.literals.contains_key(temp_id)
    }

    pub fn is_predicate(&self, temp_id: &str) -> bool {
        self.predicates.contains_key(temp_id)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
            && self.literals.is_empty()
            && self.predicates.is_empty()
            && self.lists.is_empty()
    }
}

/// Predicate reference to its objects.
pub type StatementMap = BTreeMap<String, Vec<StatementObjectDefinition>>;

/// An object node of a statement tree. Nested statements use `id` as
/// their subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementObjectDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub statements: StatementMap,
}

impl StatementObjectDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            statements: StatementMap::new(),
        }
    }

    pub fn with_statements(id: impl Into<String>, statements: StatementMap) -> Self {
        Self {
            id: id.into(),
            statements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionDefinition {
    pub label: String,
    #[serde(default)]
    pub classes: BTreeSet<ThingId>,
    #[serde(default)]
    pub statements: StatementMap,
}

/// Placeholder standing for the contribution at `index` of a payload.
pub fn contribution_placeholder(index: usize) -> String {
    format!("^{index}")
}

/// New things plus the contributions that describe a paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperContents {
    #[serde(flatten)]
    pub definitions: ThingDefinitions,
    #[serde(default)]
    pub contributions: Vec<ContributionDefinition>,
}
