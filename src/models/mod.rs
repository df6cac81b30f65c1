//! Domain models for the content graph.

mod author;
mod community;
mod contents;
pub mod identifiers;
mod paper;
mod statement;
mod thing;
pub mod vocab;

pub use author::Author;
pub use community::{ContributorId, ObservatoryId, OrganizationId};
pub use contents::{
    contribution_placeholder, ContributionDefinition, ListDefinition, LiteralDefinition,
    PaperContents, PredicateDefinition, ResourceDefinition, StatementMap,
    StatementObjectDefinition, ThingDefinition, ThingDefinitions,
};
pub use paper::{
    ContentsCommand, ContributionCreated, CreateContributionCommand, CreatePaperCommand,
    PublicationInfo,
};
pub use statement::{BakedStatement, Statement, StatementId};
pub use thing::{
    Class, ExtractionMethod, GraphList, Literal, Predicate, Resource, ResourceMetadata, Thing,
    ThingId, ThingKind,
};

use ulid::Ulid;

/// Generates a new ULID string.
pub fn generate_ulid() -> String {
    Ulid::new().to_string()
}
