//! Research field reference and link.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::vocab::{classes, predicates};
use crate::models::{CreatePaperCommand, ThingId};
use crate::repositories::AppStore;
use crate::services::pipeline::{Action, PipelineStage, PipelineState};

/// Accepts at most one research field, which must be a `ResearchField`
/// resource.
#[derive(Clone)]
pub struct ResearchFieldValidator {
    store: AppStore,
}

impl ResearchFieldValidator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for ResearchFieldValidator {
    fn name(&self) -> &'static str {
        "research_field_validator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ReferencesValidated
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        if command.research_fields.len() > 1 {
            return Err(AppError::OnlyOneResearchFieldAllowed);
        }

        let field_class = ThingId::new(classes::RESEARCH_FIELD);
        for id in &command.research_fields {
            let is_field = self
                .store
                .find_resource_by_id(id)
                .await?
                .is_some_and(|r| r.has_class(&field_class));
            if !is_field {
                return Err(AppError::ResearchFieldNotFound(id.clone()));
            }
        }
        Ok(state)
    }
}

#[derive(Clone)]
pub struct ResearchFieldCreator {
    store: AppStore,
}

impl ResearchFieldCreator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for ResearchFieldCreator {
    fn name(&self) -> &'static str {
        "research_field_creator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Materializing
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        let root = state.root_id()?;
        for field in &command.research_fields {
            self.store
                .add_statement(
                    root.clone(),
                    ThingId::new(predicates::HAS_RESEARCH_FIELD),
                    field.clone(),
                )
                .await?;
        }
        Ok(state)
    }
}
