//! Pipeline actions for paper and contribution commands.
//!
//! Validators only read from the store and fill the [`PipelineState`];
//! creators write, and always run after every validator.

mod authors;
mod community;
mod contents;
mod descriptions;
mod existence;
mod paper_resource;
mod publication;
mod research_fields;
mod statements;
mod temp_ids;
mod thing_definitions;

pub use authors::{AuthorCreator, AuthorValidator};
pub use community::{ObservatoryValidator, OrganizationValidator};
pub use contents::ContentsCreator;
pub use descriptions::DescriptionCreator;
pub use existence::PaperExistenceValidator;
pub use paper_resource::PaperResourceCreator;
pub use publication::{PublicationInfoCreator, PublicationInfoValidator};
pub use research_fields::{ResearchFieldCreator, ResearchFieldValidator};
pub use statements::StatementBaker;
pub use temp_ids::TempIdValidator;
pub use thing_definitions::ThingDefinitionValidator;

use std::collections::HashMap;

use crate::config::LabelConfig;
use crate::error::AppError;
use crate::models::{Thing, ThingId};
use crate::repositories::{AppStore, CreateLiteral};

use super::pipeline::{PipelineState, ValidatedId};

/// Rejects blank labels, labels with a line break and labels longer than
/// `labels.max_length` characters.
fn check_label(id: &str, label: &str, labels: &LabelConfig) -> Result<(), AppError> {
    let valid = !label.trim().is_empty()
        && !label.contains(|c: char| c == '\n' || c == '\r')
        && label.chars().count() <= labels.max_length;
    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidLabel { id: id.to_string() })
    }
}

/// Looks `id` up unless an earlier stage already did, caching the result.
/// Returns `None` when the id resolves to nothing.
async fn resolve(
    store: &AppStore,
    validated: &mut HashMap<String, ValidatedId>,
    id: &str,
) -> Result<Option<ValidatedId>, AppError> {
    if let Some(known) = validated.get(id) {
        return Ok(Some(known.clone()));
    }

    match store.find_by_thing_id(&ThingId::new(id)).await? {
        Some(thing) => {
            let entry = ValidatedId::Thing(thing);
            validated.insert(id.to_string(), entry.clone());
            Ok(Some(entry))
        }
        None => Ok(None),
    }
}

/// Resolves a class reference, rejecting missing ids and non-classes.
async fn resolve_class(
    store: &AppStore,
    state: &mut PipelineState,
    id: &ThingId,
) -> Result<(), AppError> {
    match resolve(store, &mut state.validated_ids, id.as_str()).await? {
        Some(ValidatedId::Thing(Thing::Class(_))) => Ok(()),
        Some(_) => Err(AppError::ThingIsNotAClass(id.to_string())),
        None => Err(AppError::ThingNotFound(id.to_string())),
    }
}

/// Creates a literal and links it from `subject` through `predicate`.
async fn link_literal(
    store: &AppStore,
    subject: &ThingId,
    predicate: &str,
    literal: CreateLiteral,
) -> Result<ThingId, AppError> {
    let literal_id = store.create_literal(literal).await?;
    store
        .add_statement(subject.clone(), ThingId::new(predicate), literal_id.clone())
        .await?;
    Ok(literal_id)
}
