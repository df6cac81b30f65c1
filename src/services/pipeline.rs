//! Stage-by-stage execution of a command.
//!
//! A [`Pipeline`] folds an owned [`PipelineState`] through an ordered list of
//! [`Action`]s. Each action consumes the state and hands back the updated
//! one; the first error aborts the run. Nothing is rolled back: entities
//! created before a failure during [`PipelineStage::Materializing`] remain.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tracing::Instrument;

use crate::error::AppError;
use crate::models::{generate_ulid, Author, BakedStatement, Thing, ThingId, ThingKind};

/// Lifecycle of one invocation. Stages only ever move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    #[default]
    Received,
    TempIdsValidated,
    ReferencesValidated,
    StatementsBaked,
    ExistenceChecked,
    Materializing,
    Committed,
    Failed,
}

/// Outcome of validating one referenced id.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedId {
    /// A placeholder declared in the payload; created during materialization.
    TempId,
    /// An existing thing.
    Thing(Thing),
}

impl ValidatedId {
    pub fn kind(&self) -> Option<ThingKind> {
        match self {
            ValidatedId::TempId => None,
            ValidatedId::Thing(thing) => Some(thing.kind()),
        }
    }
}

/// Accumulator threaded through the stages of one invocation.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub stage: PipelineStage,
    /// Every placeholder declared by the payload.
    pub temp_ids: BTreeSet<String>,
    pub validated_ids: HashMap<String, ValidatedId>,
    pub baked_statements: Vec<BakedStatement>,
    /// Authors after resolution against existing author resources.
    pub authors: Vec<Author>,
    /// Existing venue to link, if one matched.
    pub venue: Option<ThingId>,
    /// The paper everything hangs off.
    pub root_id: Option<ThingId>,
    pub contribution_ids: Vec<ThingId>,
}

impl PipelineState {
    pub fn is_temp_id(&self, id: &str) -> bool {
        matches!(self.validated_ids.get(id), Some(ValidatedId::TempId))
    }

    pub fn root_id(&self) -> Result<&ThingId, AppError> {
        self.root_id
            .as_ref()
            .ok_or_else(|| AppError::Internal("root entity not created yet".to_string()))
    }

    fn advance(mut self, stage: PipelineStage) -> Result<Self, AppError> {
        if stage < self.stage {
            return Err(AppError::Internal(format!(
                "stage {stage:?} cannot follow {:?}",
                self.stage
            )));
        }
        self.stage = stage;
        Ok(self)
    }
}

/// One step of a pipeline over command type `C`.
#[async_trait]
pub trait Action<C: ?Sized + Sync>: Send + Sync {
    fn name(&self) -> &'static str;

    /// The lifecycle stage this action contributes to.
    fn stage(&self) -> PipelineStage;

    async fn run(&self, command: &C, state: PipelineState) -> Result<PipelineState, AppError>;
}

/// An ordered list of actions for one command type.
pub struct Pipeline<C: ?Sized + Sync> {
    kind: &'static str,
    actions: Vec<Box<dyn Action<C>>>,
}

impl<C: ?Sized + Sync> Pipeline<C> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            actions: Vec::new(),
        }
    }

    pub fn then(mut self, action: impl Action<C> + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    pub fn action_names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    /// Runs every action in order and returns the committed state.
    pub async fn run(&self, command: &C) -> Result<PipelineState, AppError> {
        let span = tracing::info_span!("pipeline", kind = self.kind, request_id = %generate_ulid());
        self.execute(command).instrument(span).await
    }

    async fn execute(&self, command: &C) -> Result<PipelineState, AppError> {
        let mut state = PipelineState::default();

        for action in &self.actions {
            let stage = action.stage();
            state = state.advance(stage)?;
            tracing::debug!(action = action.name(), stage = ?stage, "Running stage");

            state = match action.run(command, state).await {
                Ok(next) => next,
                Err(err) => {
                    if stage == PipelineStage::Materializing {
                        tracing::error!(
                            action = action.name(),
                            code = err.code(),
                            stage = ?PipelineStage::Failed,
                            "Materialization failed: {err}; entities created so far are kept"
                        );
                    } else {
                        tracing::info!(action = action.name(), code = err.code(), "Rejected: {err}");
                    }
                    return Err(err);
                }
            };
        }

        let state = state.advance(PipelineStage::Committed)?;
        tracing::info!(
            root_id = ?state.root_id,
            contributions = state.contribution_ids.len(),
            statements = state.baked_statements.len(),
            "Pipeline committed"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Record {
        name: &'static str,
        stage: PipelineStage,
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl Action<()> for Record {
        fn name(&self) -> &'static str {
            self.name
        }

        fn stage(&self) -> PipelineStage {
            self.stage
        }

        async fn run(&self, _command: &(), mut state: PipelineState) -> Result<PipelineState, AppError> {
            self.calls.lock().unwrap().push(self.name);
            if self.fail {
                return Err(AppError::ThingNotFound(self.name.to_string()));
            }
            state.temp_ids.insert(self.name.to_string());
            Ok(state)
        }
    }

    fn record(
        name: &'static str,
        stage: PipelineStage,
        calls: &Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    ) -> Record {
        Record {
            name,
            stage,
            calls: calls.clone(),
            fail,
        }
    }

    #[tokio::test]
    async fn test_runs_actions_in_order_and_commits() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::<()>::new("test")
            .then(record("a", PipelineStage::TempIdsValidated, &calls, false))
            .then(record("b", PipelineStage::ReferencesValidated, &calls, false))
            .then(record("c", PipelineStage::ReferencesValidated, &calls, false));

        let state = pipeline.run(&()).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(state.stage, PipelineStage::Committed);
        assert_eq!(state.temp_ids.len(), 3);
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_run() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::<()>::new("test")
            .then(record("a", PipelineStage::TempIdsValidated, &calls, true))
            .then(record("b", PipelineStage::Materializing, &calls, false));

        let err = pipeline.run(&()).await.unwrap_err();

        assert!(matches!(err, AppError::ThingNotFound(_)));
        assert_eq!(*calls.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_stage_regression_is_rejected() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::<()>::new("test")
            .then(record("late", PipelineStage::Materializing, &calls, false))
            .then(record("early", PipelineStage::TempIdsValidated, &calls, false));

        let err = pipeline.run(&()).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(*calls.lock().unwrap(), vec!["late"]);
    }
}
