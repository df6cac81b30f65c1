//! Materialization of payload definitions, contributions and baked
//! statements.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::DescriptionCreator;
use crate::error::AppError;
use crate::models::vocab::{classes, predicates};
use crate::models::{
    contribution_placeholder, BakedStatement, ContentsCommand, ResourceMetadata, ThingDefinition,
    ThingDefinitions, ThingId,
};
use crate::repositories::{AppStore, CreateList, CreateLiteral, CreateResource};
use crate::services::pipeline::{Action, PipelineStage, PipelineState};

/// Placeholder to created id, filled as things are created.
#[derive(Debug, Default)]
struct CreatedIds(HashMap<String, ThingId>);

impl CreatedIds {
    fn insert(&mut self, placeholder: impl Into<String>, id: ThingId) {
        self.0.insert(placeholder.into(), id);
    }

    fn is_placeholder(&self, reference: &str) -> bool {
        self.0.contains_key(reference)
    }

    /// The created id for a placeholder, otherwise the reference itself.
    fn substitute(&self, reference: &str) -> ThingId {
        self.0
            .get(reference)
            .cloned()
            .unwrap_or_else(|| ThingId::new(reference))
    }
}

/// Creates literals, predicates, resources, lists, contributions and
/// finally statements, in that order.
///
/// A failure part-way leaves everything created before it in the store.
#[derive(Clone)]
pub struct ContentsCreator {
    store: AppStore,
    descriptions: DescriptionCreator,
}

impl ContentsCreator {
    pub fn new(store: AppStore) -> Self {
        Self {
            descriptions: DescriptionCreator::new(store.clone()),
            store,
        }
    }

    async fn create_definitions(
        &self,
        definitions: &ThingDefinitions,
        metadata: &ResourceMetadata,
        state: &PipelineState,
        created: &mut CreatedIds,
    ) -> Result<(), AppError> {
        let mut lists = Vec::new();

        for (temp_id, definition) in definitions.in_creation_order() {
            if !state.is_temp_id(temp_id) {
                continue;
            }
            let id = match definition {
                ThingDefinition::Literal(literal) => {
                    self.store
                        .create_literal(CreateLiteral::new(
                            literal.label.as_str(),
                            &literal.data_type,
                        ))
                        .await?
                }
                ThingDefinition::Predicate(predicate) => {
                    let id = self.store.create_predicate(predicate.label.clone()).await?;
                    if let Some(description) = &predicate.description {
                        self.descriptions.create(&id, description).await?;
                    }
                    id
                }
                ThingDefinition::Resource(resource) => {
                    self.store
                        .create_resource(CreateResource {
                            label: resource.label.clone(),
                            classes: resource.classes.clone(),
                            metadata: metadata.clone(),
                        })
                        .await?
                }
                ThingDefinition::List(list) => {
                    let id = self
                        .store
                        .create_list(CreateList {
                            label: list.label.clone(),
                            elements: Vec::new(),
                        })
                        .await?;
                    lists.push((id.clone(), list));
                    id
                }
            };
            tracing::debug!(temp_id = %temp_id, id = %id, "Created thing");
            created.insert(temp_id, id);
        }

        // Elements may name lists, so they are filled once every list exists.
        for (id, list) in lists {
            let elements = list
                .elements
                .iter()
                .map(|element| created.substitute(element))
                .collect();
            self.store.update_list(&id, elements).await?;
        }
        Ok(())
    }

    async fn create_contributions<C: ContentsCommand>(
        &self,
        command: &C,
        metadata: &ResourceMetadata,
        state: &mut PipelineState,
        created: &mut CreatedIds,
    ) -> Result<(), AppError> {
        let root = state.root_id()?.clone();

        for (index, contribution) in command.contributions().iter().enumerate() {
            let mut class_ids = contribution.classes.clone();
            class_ids.insert(ThingId::new(classes::CONTRIBUTION));

            let id = self
                .store
                .create_resource(CreateResource {
                    label: contribution.label.clone(),
                    classes: class_ids,
                    metadata: metadata.clone(),
                })
                .await?;
            self.store
                .add_statement(
                    root.clone(),
                    ThingId::new(predicates::HAS_CONTRIBUTION),
                    id.clone(),
                )
                .await?;

            created.insert(contribution_placeholder(index), id.clone());
            state.contribution_ids.push(id);
        }
        Ok(())
    }

    /// Returns the number of distinct triples after substitution.
    async fn create_statements(
        &self,
        baked: &[BakedStatement],
        created: &CreatedIds,
    ) -> Result<usize, AppError> {
        let mut committed = HashSet::new();

        for statement in baked {
            let subject = created.substitute(&statement.subject);
            let predicate = created.substitute(&statement.predicate);
            let object = created.substitute(&statement.object);

            if !committed.insert((subject.clone(), predicate.clone(), object.clone())) {
                continue;
            }

            let all_existing = [&statement.subject, &statement.predicate, &statement.object]
                .into_iter()
                .all(|reference| !created.is_placeholder(reference));
            if all_existing
                && self
                    .store
                    .find_by_subject_predicate_object(&subject, &predicate, &object)
                    .await?
                    .is_some()
            {
                tracing::debug!(statement = %statement, "Statement already exists");
                continue;
            }

            self.store.add_statement(subject, predicate, object).await?;
        }
        Ok(committed.len())
    }
}

#[async_trait]
impl<C: ContentsCommand> Action<C> for ContentsCreator {
    fn name(&self) -> &'static str {
        "contents_creator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Materializing
    }

    async fn run(&self, command: &C, mut state: PipelineState) -> Result<PipelineState, AppError> {
        let metadata = command.metadata();
        let mut created = CreatedIds::default();

        if let Some(definitions) = command.definitions() {
            self.create_definitions(definitions, &metadata, &state, &mut created)
                .await?;
        }
        self.create_contributions(command, &metadata, &mut state, &mut created)
            .await?;
        let distinct = self
            .create_statements(&state.baked_statements, &created)
            .await?;

        tracing::debug!(
            things = created.0.len(),
            statements = distinct,
            "Contents materialized"
        );
        Ok(state)
    }
}
