//! Author resolution and linking.

use async_trait::async_trait;

use super::{check_label, link_literal};
use crate::config::LabelConfig;
use crate::error::AppError;
use crate::models::identifiers::{find_kind, AUTHOR_IDENTIFIERS};
use crate::models::vocab::{classes, datatypes, predicates, AUTHORS_LIST_LABEL};
use crate::models::{Author, ContentsCommand, CreatePaperCommand, ThingId};
use crate::repositories::{AppStore, CreateList, CreateLiteral, CreateResource};
use crate::services::pipeline::{Action, PipelineStage, PipelineState};

// ============================================================================
// Validation
// ============================================================================

/// Resolves each author to an existing `Author` resource by id and by
/// identifiers, rejecting authors whose signals disagree.
#[derive(Clone)]
pub struct AuthorValidator {
    store: AppStore,
    labels: LabelConfig,
}

impl AuthorValidator {
    pub fn new(store: AppStore, labels: LabelConfig) -> Self {
        Self { store, labels }
    }

    async fn resolve_author(&self, author: &Author) -> Result<Author, AppError> {
        check_label("author name", &author.name, &self.labels)?;

        // Identifier formats are checked before any lookup.
        let mut known = Vec::new();
        for (key, values) in &author.identifiers {
            let Some(kind) = find_kind(AUTHOR_IDENTIFIERS, key) else {
                tracing::debug!(key = %key, "Ignoring unknown author identifier");
                continue;
            };
            for value in values {
                if !kind.is_valid(value) {
                    return Err(AppError::InvalidIdentifier {
                        field: key.clone(),
                        value: value.clone(),
                    });
                }
                known.push((kind, value));
            }
        }

        let mut resolved: Option<ThingId> = None;
        if let Some(id) = &author.id {
            let is_author = self
                .store
                .find_resource_by_id(id)
                .await?
                .is_some_and(|r| r.has_class(&ThingId::new(classes::AUTHOR)));
            if !is_author {
                return Err(AppError::AuthorNotFound(id.clone()));
            }
            resolved = Some(id.clone());
        }

        let author_class = ThingId::new(classes::AUTHOR);
        for (kind, value) in known {
            let matches = self
                .store
                .find_all_by_predicate_and_label_and_subject_class(
                    &ThingId::new(kind.predicate),
                    value,
                    &author_class,
                )
                .await?;
            for statement in matches {
                if resolved.is_none() {
                    resolved = Some(statement.subject);
                } else if resolved.as_ref() != Some(&statement.subject) {
                    return Err(AppError::AmbiguousAuthor {
                        name: author.name.clone(),
                    });
                }
            }
        }

        Ok(match resolved {
            Some(id) => Author::resolved(id, author.name.clone()),
            None => author.clone(),
        })
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for AuthorValidator {
    fn name(&self) -> &'static str {
        "author_validator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ReferencesValidated
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        mut state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        let mut authors = Vec::with_capacity(command.authors.len());
        for author in &command.authors {
            authors.push(self.resolve_author(author).await?);
        }
        state.authors = authors;
        Ok(state)
    }
}

// ============================================================================
// Creation
// ============================================================================

/// Links the paper to an ordered list of its authors.
///
/// Resolved authors are referenced directly. Unresolved authors with
/// identifiers or a homepage become new `Author` resources; name-only
/// authors become string literals.
#[derive(Clone)]
pub struct AuthorCreator {
    store: AppStore,
}

impl AuthorCreator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }

    async fn create_element(
        &self,
        command: &CreatePaperCommand,
        author: &Author,
    ) -> Result<ThingId, AppError> {
        if let Some(id) = &author.id {
            return Ok(id.clone());
        }

        if author.identifiers.is_empty() && author.homepage.is_none() {
            return self
                .store
                .create_literal(CreateLiteral::new(author.name.as_str(), datatypes::STRING))
                .await;
        }

        let author_id = self
            .store
            .create_resource(CreateResource {
                label: author.name.clone(),
                classes: [ThingId::new(classes::AUTHOR)].into(),
                metadata: command.metadata(),
            })
            .await?;

        for (key, values) in &author.identifiers {
            let Some(kind) = find_kind(AUTHOR_IDENTIFIERS, key) else {
                continue;
            };
            for value in values {
                link_literal(
                    &self.store,
                    &author_id,
                    kind.predicate,
                    CreateLiteral::new(value.as_str(), datatypes::STRING),
                )
                .await?;
            }
        }

        if let Some(homepage) = &author.homepage {
            link_literal(
                &self.store,
                &author_id,
                predicates::HAS_WEBSITE,
                CreateLiteral::new(homepage.as_str(), datatypes::ANY_URI),
            )
            .await?;
        }

        Ok(author_id)
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for AuthorCreator {
    fn name(&self) -> &'static str {
        "author_creator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Materializing
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        if state.authors.is_empty() {
            return Ok(state);
        }

        let mut elements = Vec::with_capacity(state.authors.len());
        for author in &state.authors {
            elements.push(self.create_element(command, author).await?);
        }

        let list = self
            .store
            .create_list(CreateList {
                label: AUTHORS_LIST_LABEL.to_string(),
                elements,
            })
            .await?;
        self.store
            .add_statement(
                state.root_id()?.clone(),
                ThingId::new(predicates::HAS_AUTHORS),
                list,
            )
            .await?;
        Ok(state)
    }
}
