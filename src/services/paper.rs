//! Paper and contribution creation.

use crate::context::{AppConfig, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{ContributionCreated, CreateContributionCommand, CreatePaperCommand, ThingId};
use crate::repositories::AppStore;

use super::actions::{
    AuthorCreator, AuthorValidator, ContentsCreator, ObservatoryValidator, OrganizationValidator,
    PaperExistenceValidator, PaperResourceCreator, PublicationInfoCreator,
    PublicationInfoValidator, ResearchFieldCreator, ResearchFieldValidator, StatementBaker,
    TempIdValidator, ThingDefinitionValidator,
};
use super::pipeline::Pipeline;

/// Runs the create-paper and create-contribution pipelines against the
/// shared store.
#[derive(FromContext, Clone)]
pub struct PaperService {
    store: AppStore,
    config: AppConfig,
}

impl PaperService {
    /// Creates a paper with its authors, publication info and contents.
    /// Returns the new paper id.
    pub async fn create(&self, command: &CreatePaperCommand) -> Result<ThingId, AppError> {
        let state = self.paper_pipeline().run(command).await?;
        state.root_id().cloned()
    }

    /// Adds one contribution to an existing paper.
    pub async fn create_contribution(
        &self,
        command: &CreateContributionCommand,
    ) -> Result<ContributionCreated, AppError> {
        let state = self.contribution_pipeline().run(command).await?;
        let contribution_id = state
            .contribution_ids
            .first()
            .cloned()
            .ok_or_else(|| AppError::Internal("no contribution was created".to_string()))?;

        Ok(ContributionCreated {
            paper_id: state.root_id()?.clone(),
            contribution_id,
        })
    }

    pub fn paper_pipeline(&self) -> Pipeline<CreatePaperCommand> {
        let pipeline = &self.config.pipeline;
        let store = &self.store;

        Pipeline::new("paper")
            .then(TempIdValidator::new(pipeline))
            .then(ResearchFieldValidator::new(store.clone()))
            .then(ObservatoryValidator::new(store.clone()))
            .then(OrganizationValidator::new(store.clone()))
            .then(AuthorValidator::new(
                store.clone(),
                self.config.labels.clone(),
            ))
            .then(PublicationInfoValidator::new(store.clone()))
            .then(ThingDefinitionValidator::new(
                store.clone(),
                self.config.labels.clone(),
            ))
            .then(StatementBaker::new(store.clone(), pipeline))
            .then(PaperExistenceValidator::new(
                store.clone(),
                self.config.labels.clone(),
            ))
            .then(PaperResourceCreator::new(store.clone()))
            .then(AuthorCreator::new(store.clone()))
            .then(ResearchFieldCreator::new(store.clone()))
            .then(PublicationInfoCreator::new(store.clone()))
            .then(ContentsCreator::new(store.clone()))
    }

    pub fn contribution_pipeline(&self) -> Pipeline<CreateContributionCommand> {
        let pipeline = &self.config.pipeline;
        let store = &self.store;

        Pipeline::new("contribution")
            .then(TempIdValidator::new(pipeline))
            .then(ThingDefinitionValidator::new(
                store.clone(),
                self.config.labels.clone(),
            ))
            .then(StatementBaker::new(store.clone(), pipeline))
            .then(PaperExistenceValidator::new(
                store.clone(),
                self.config.labels.clone(),
            ))
            .then(ContentsCreator::new(store.clone()))
    }
}
