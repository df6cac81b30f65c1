//! Duplicate-paper detection and contribution targets.

use async_trait::async_trait;

use super::check_label;
use crate::config::LabelConfig;
use crate::error::{AppError, ExistingPaper};
use crate::models::identifiers::{find_kind, PAPER_IDENTIFIERS};
use crate::models::vocab::classes;
use crate::models::{CreateContributionCommand, CreatePaperCommand, ThingId};
use crate::repositories::{AppStore, SearchString};
use crate::services::pipeline::{Action, PipelineStage, PipelineState};

/// On the paper path, rejects invalid titles and papers that already exist
/// by title or identifier. On the contribution path, requires the target paper to exist
/// and makes it the root of the run.
#[derive(Clone)]
pub struct PaperExistenceValidator {
    store: AppStore,
    labels: LabelConfig,
}

impl PaperExistenceValidator {
    pub fn new(store: AppStore, labels: LabelConfig) -> Self {
        Self { store, labels }
    }

    async fn check_title(&self, title: &str) -> Result<(), AppError> {
        let existing = self
            .store
            .find_all_by_class_and_label(
                &ThingId::new(classes::PAPER),
                &SearchString::Exact(title.to_string()),
            )
            .await?;
        if let Some(paper) = existing.first() {
            tracing::debug!(paper_id = %paper.id, "Paper title already taken");
            return Err(AppError::PaperAlreadyExists(ExistingPaper::Title(
                title.to_string(),
            )));
        }
        Ok(())
    }

    async fn check_identifiers(&self, command: &CreatePaperCommand) -> Result<(), AppError> {
        let mut known = Vec::new();
        for (key, value) in &command.identifiers {
            let Some(kind) = find_kind(PAPER_IDENTIFIERS, key) else {
                tracing::debug!(key = %key, "Ignoring unknown paper identifier");
                continue;
            };
            if !kind.is_valid(value) {
                return Err(AppError::InvalidIdentifier {
                    field: key.clone(),
                    value: value.clone(),
                });
            }
            known.push((kind, key, value));
        }

        let paper_class = ThingId::new(classes::PAPER);
        for (kind, key, value) in known {
            let matches = self
                .store
                .find_all_by_predicate_and_label_and_subject_class(
                    &ThingId::new(kind.predicate),
                    value,
                    &paper_class,
                )
                .await?;
            if !matches.is_empty() {
                return Err(AppError::PaperAlreadyExists(ExistingPaper::Identifier {
                    key: key.clone(),
                    value: value.clone(),
                }));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for PaperExistenceValidator {
    fn name(&self) -> &'static str {
        "paper_existence_validator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ExistenceChecked
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        check_label("title", &command.title, &self.labels)?;
        self.check_title(&command.title).await?;
        self.check_identifiers(command).await?;
        Ok(state)
    }
}

#[async_trait]
impl Action<CreateContributionCommand> for PaperExistenceValidator {
    fn name(&self) -> &'static str {
        "paper_existence_validator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ExistenceChecked
    }

    async fn run(
        &self,
        command: &CreateContributionCommand,
        mut state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        let is_paper = self
            .store
            .find_resource_by_id(&command.paper_id)
            .await?
            .is_some_and(|r| r.has_class(&ThingId::new(classes::PAPER)));
        if !is_paper {
            return Err(AppError::PaperNotFound(command.paper_id.clone()));
        }
        state.root_id = Some(command.paper_id.clone());
        Ok(state)
    }
}
