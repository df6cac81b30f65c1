//! The paper resource itself.

use async_trait::async_trait;

use super::link_literal;
use crate::error::AppError;
use crate::models::identifiers::{find_kind, PAPER_IDENTIFIERS};
use crate::models::vocab::{classes, datatypes};
use crate::models::{ContentsCommand, CreatePaperCommand, ThingId};
use crate::repositories::{AppStore, CreateLiteral, CreateResource};
use crate::services::pipeline::{Action, PipelineStage, PipelineState};

/// Creates the `Paper` resource, makes it the root of the run and links its
/// identifiers.
#[derive(Clone)]
pub struct PaperResourceCreator {
    store: AppStore,
}

impl PaperResourceCreator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for PaperResourceCreator {
    fn name(&self) -> &'static str {
        "paper_resource_creator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Materializing
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        mut state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        let paper_id = self
            .store
            .create_resource(CreateResource {
                label: command.title.clone(),
                classes: [ThingId::new(classes::PAPER)].into(),
                metadata: command.metadata(),
            })
            .await?;
        tracing::info!(paper_id = %paper_id, "Created paper");

        for (key, value) in &command.identifiers {
            if let Some(kind) = find_kind(PAPER_IDENTIFIERS, key) {
                link_literal(
                    &self.store,
                    &paper_id,
                    kind.predicate,
                    CreateLiteral::new(value.as_str(), datatypes::STRING),
                )
                .await?;
            }
        }

        state.root_id = Some(paper_id);
        Ok(state)
    }
}
