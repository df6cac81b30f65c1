//! Observatory and organization references.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::CreatePaperCommand;
use crate::repositories::AppStore;
use crate::services::pipeline::{Action, PipelineStage, PipelineState};

#[derive(Clone)]
pub struct ObservatoryValidator {
    store: AppStore,
}

impl ObservatoryValidator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for ObservatoryValidator {
    fn name(&self) -> &'static str {
        "observatory_validator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ReferencesValidated
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        if command.observatories.len() > 1 {
            return Err(AppError::OnlyOneObservatoryAllowed);
        }
        for id in &command.observatories {
            if !self.store.observatory_exists(*id).await? {
                return Err(AppError::ObservatoryNotFound(*id));
            }
        }
        Ok(state)
    }
}

#[derive(Clone)]
pub struct OrganizationValidator {
    store: AppStore,
}

impl OrganizationValidator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for OrganizationValidator {
    fn name(&self) -> &'static str {
        "organization_validator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ReferencesValidated
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        if command.organizations.len() > 1 {
            return Err(AppError::OnlyOneOrganizationAllowed);
        }
        for id in &command.organizations {
            if !self.store.organization_exists(*id).await? {
                return Err(AppError::OrganizationNotFound(*id));
            }
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ObservatoryId, OrganizationId};
    use crate::services::actions::testing;

    #[tokio::test]
    async fn test_known_observatory_passes() {
        let observatory = ObservatoryId::new();
        let (_, store) = testing::store(testing::snapshot().with_observatory(observatory));
        let command = CreatePaperCommand {
            observatories: vec![observatory],
            ..testing::paper_command()
        };

        let result = ObservatoryValidator::new(store)
            .run(&command, PipelineState::default())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_observatory_is_not_found() {
        let (_, store) = testing::store(testing::snapshot());
        let command = CreatePaperCommand {
            observatories: vec![ObservatoryId::new()],
            ..testing::paper_command()
        };

        let result = ObservatoryValidator::new(store)
            .run(&command, PipelineState::default())
            .await;
        assert!(matches!(result, Err(AppError::ObservatoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_more_than_one_organization_is_rejected() {
        let (graph, store) = testing::store(testing::snapshot());
        let command = CreatePaperCommand {
            organizations: vec![OrganizationId::new(), OrganizationId::new()],
            ..testing::paper_command()
        };

        let result = OrganizationValidator::new(store)
            .run(&command, PipelineState::default())
            .await;
        assert!(matches!(result, Err(AppError::OnlyOneOrganizationAllowed)));
        assert_eq!(graph.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_organization_is_not_found() {
        let (_, store) = testing::store(testing::snapshot());
        let command = CreatePaperCommand {
            organizations: vec![OrganizationId::new()],
            ..testing::paper_command()
        };

        let result = OrganizationValidator::new(store)
            .run(&command, PipelineState::default())
            .await;
        assert!(matches!(result, Err(AppError::OrganizationNotFound(_))));
    }
}
