//! Author references in paper payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ThingId;

/// An author, either an existing `Author` resource (by id or by any of its
/// identifiers) or a new one described by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ThingId>,
    pub name: String,
    /// Identifier key (`orcid`, `google_scholar`, ...) to its values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub identifiers: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

impl Author {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            identifiers: BTreeMap::new(),
            homepage: None,
        }
    }

    /// The author as a reference to an existing resource.
    pub fn resolved(id: ThingId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            ..Self::named(name)
        }
    }
}
