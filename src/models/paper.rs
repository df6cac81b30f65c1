//! Commands accepted by the paper pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    Author, ContributionDefinition, ContributorId, ExtractionMethod, ObservatoryId,
    OrganizationId, PaperContents, ResourceMetadata, ThingDefinitions, ThingId,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i64>,
    /// Venue label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaperCommand {
    #[serde(default)]
    pub contributor_id: ContributorId,
    pub title: String,
    #[serde(default)]
    pub research_fields: Vec<ThingId>,
    /// Paper identifier key (`doi`) to value.
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
    #[serde(default)]
    pub publication_info: Option<PublicationInfo>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub observatories: Vec<ObservatoryId>,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
    #[serde(default)]
    pub contents: Option<PaperContents>,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
}

/// Adds one contribution to an existing paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateContributionCommand {
    #[serde(default)]
    pub contributor_id: ContributorId,
    pub paper_id: ThingId,
    #[serde(default)]
    pub extraction_method: ExtractionMethod,
    #[serde(flatten)]
    pub definitions: ThingDefinitions,
    pub contribution: ContributionDefinition,
}

/// Access to the definitions and contributions shared by both commands.
pub trait ContentsCommand: Send + Sync {
    fn definitions(&self) -> Option<&ThingDefinitions>;

    fn contributions(&self) -> &[ContributionDefinition];

    /// Whether contribution errors should name the contribution index.
    fn indexes_contributions(&self) -> bool;

    /// Provenance stamped on every resource the command creates.
    fn metadata(&self) -> ResourceMetadata;
}

impl ContentsCommand for CreatePaperCommand {
    fn definitions(&self) -> Option<&ThingDefinitions> {
        self.contents.as_ref().map(|c| &c.definitions)
    }

    fn contributions(&self) -> &[ContributionDefinition] {
        self.contents
            .as_ref()
            .map(|c| c.contributions.as_slice())
            .unwrap_or_default()
    }

    fn indexes_contributions(&self) -> bool {
        true
    }

    fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            contributor_id: Some(self.contributor_id),
            observatory_id: self.observatories.first().copied(),
            organization_id: self.organizations.first().copied(),
            extraction_method: self.extraction_method,
        }
    }
}

impl ContentsCommand for CreateContributionCommand {
    fn definitions(&self) -> Option<&ThingDefinitions> {
        Some(&self.definitions)
    }

    fn contributions(&self) -> &[ContributionDefinition] {
        std::slice::from_ref(&self.contribution)
    }

    fn indexes_contributions(&self) -> bool {
        false
    }

    fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            contributor_id: Some(self.contributor_id),
            extraction_method: self.extraction_method,
            ..ResourceMetadata::default()
        }
    }
}

/// Result of adding a contribution to a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionCreated {
    pub paper_id: ThingId,
    pub contribution_id: ThingId,
}
