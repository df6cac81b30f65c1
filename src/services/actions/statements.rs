//! Flattening of contribution statement trees into baked triples.

use async_trait::async_trait;

use super::{resolve, resolve_class};
use crate::config::PipelineConfig;
use crate::error::AppError;
use crate::models::vocab::classes;
use crate::models::{
    contribution_placeholder, BakedStatement, ContentsCommand, ContributionDefinition,
    StatementMap, StatementObjectDefinition, Thing, ThingDefinitions, ThingKind,
};
use crate::repositories::AppStore;
use crate::services::pipeline::{Action, PipelineStage, PipelineState, ValidatedId};

/// One edge of a statement tree, in traversal order.
struct Edge<'a> {
    subject: &'a str,
    predicate: &'a str,
    object: &'a StatementObjectDefinition,
}

/// Validates every contribution and emits one [`BakedStatement`] per edge of
/// its statement tree, nested edges included.
///
/// Subjects of top-level edges are the contribution placeholders `^<index>`.
/// Edges are emitted in pre-order with predicates in key order.
#[derive(Clone)]
pub struct StatementBaker {
    store: AppStore,
    max_depth: usize,
}

impl StatementBaker {
    pub fn new(store: AppStore, config: &PipelineConfig) -> Self {
        Self {
            store,
            max_depth: config.max_statement_depth,
        }
    }

    /// Collects edges below `subject`, enforcing the depth bound and
    /// rejecting objects that re-expand a node on their own path.
    fn flatten<'a>(
        &self,
        subject: &'a str,
        statements: &'a StatementMap,
        depth: usize,
        path: &mut Vec<&'a str>,
        edges: &mut Vec<Edge<'a>>,
    ) -> Result<(), AppError> {
        if depth > self.max_depth {
            return Err(AppError::StatementDepthExceeded {
                max_depth: self.max_depth,
            });
        }

        for (predicate, objects) in statements {
            for object in objects {
                edges.push(Edge {
                    subject,
                    predicate,
                    object,
                });
                if object.statements.is_empty() {
                    continue;
                }
                if path.contains(&object.id.as_str()) {
                    return Err(AppError::StatementCycle(object.id.clone()));
                }
                path.push(&object.id);
                self.flatten(&object.id, &object.statements, depth + 1, path, edges)?;
                path.pop();
            }
        }
        Ok(())
    }

    async fn check_predicate(
        &self,
        definitions: &ThingDefinitions,
        state: &mut PipelineState,
        id: &str,
    ) -> Result<(), AppError> {
        if state.temp_ids.contains(id) {
            return if definitions.is_predicate(id) {
                Ok(())
            } else {
                Err(AppError::ThingIsNotAPredicate(id.to_string()))
            };
        }

        match resolve(&self.store, &mut state.validated_ids, id).await? {
            Some(ValidatedId::Thing(Thing::Predicate(_))) => Ok(()),
            Some(_) => Err(AppError::ThingIsNotAPredicate(id.to_string())),
            None => Err(AppError::ThingNotFound(id.to_string())),
        }
    }

    /// Returns whether the object is a literal.
    async fn check_object(
        &self,
        definitions: &ThingDefinitions,
        state: &mut PipelineState,
        id: &str,
    ) -> Result<bool, AppError> {
        if state.temp_ids.contains(id) {
            return Ok(definitions.is_literal(id));
        }

        match resolve(&self.store, &mut state.validated_ids, id).await? {
            Some(validated) => Ok(validated.kind() == Some(ThingKind::Literal)),
            None => Err(AppError::ThingNotFound(id.to_string())),
        }
    }

    async fn bake_contribution(
        &self,
        definitions: &ThingDefinitions,
        state: &mut PipelineState,
        index: usize,
        indexed: bool,
        contribution: &ContributionDefinition,
    ) -> Result<(), AppError> {
        if contribution.statements.is_empty() {
            return Err(AppError::EmptyContribution {
                index: indexed.then_some(index),
            });
        }

        for class in &contribution.classes {
            if classes::RESERVED.contains(&class.as_str()) {
                return Err(AppError::ReservedClass(class.clone()));
            }
            resolve_class(&self.store, state, class).await?;
        }

        let root = contribution_placeholder(index);
        let mut path = vec![root.as_str()];
        let mut edges = Vec::new();
        self.flatten(&root, &contribution.statements, 1, &mut path, &mut edges)?;

        for edge in edges {
            self.check_predicate(definitions, state, edge.predicate).await?;
            let is_literal = self.check_object(definitions, state, &edge.object.id).await?;
            if is_literal && !edge.object.statements.is_empty() {
                return Err(AppError::InvalidStatementSubject(edge.object.id.clone()));
            }
            state.baked_statements.push(BakedStatement::new(
                edge.subject,
                edge.predicate,
                edge.object.id.as_str(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<C: ContentsCommand> Action<C> for StatementBaker {
    fn name(&self) -> &'static str {
        "statement_baker"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::StatementsBaked
    }

    async fn run(&self, command: &C, mut state: PipelineState) -> Result<PipelineState, AppError> {
        let empty = ThingDefinitions::default();
        let definitions = command.definitions().unwrap_or(&empty);
        let indexed = command.indexes_contributions();

        for (index, contribution) in command.contributions().iter().enumerate() {
            self.bake_contribution(definitions, &mut state, index, indexed, contribution)
                .await?;
        }
        tracing::debug!(count = state.baked_statements.len(), "Statements baked");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::vocab::predicates;
    use crate::models::{CreateContributionCommand, PaperContents, ThingId};
    use crate::repositories::MemoryGraph;
    use crate::services::actions::testing::{self, objects};
    use proptest::prelude::*;

    fn command(contribution: ContributionDefinition) -> CreateContributionCommand {
        CreateContributionCommand {
            contributor_id: Default::default(),
            paper_id: ThingId::new("R100"),
            extraction_method: Default::default(),
            definitions: testing::definitions(),
            contribution,
        }
    }

    fn prepared_state(definitions: &ThingDefinitions) -> PipelineState {
        let mut state = PipelineState::default();
        for id in definitions.declared_temp_ids() {
            state.temp_ids.insert(id.to_string());
            state
                .validated_ids
                .insert(id.to_string(), ValidatedId::TempId);
        }
        state
    }

    fn baker(max_depth: usize) -> (std::sync::Arc<MemoryGraph>, StatementBaker) {
        let (graph, store) = testing::store(testing::snapshot());
        let config = PipelineConfig {
            max_statement_depth: max_depth,
            ..PipelineConfig::default()
        };
        (graph, StatementBaker::new(store, &config))
    }

    async fn bake(contribution: ContributionDefinition) -> Result<PipelineState, AppError> {
        let (_, baker) = baker(32);
        let command = command(contribution);
        let state = prepared_state(&command.definitions);
        baker.run(&command, state).await
    }

    fn nested(id: &str, predicate: &str, children: Vec<StatementObjectDefinition>) -> StatementObjectDefinition {
        StatementObjectDefinition::with_statements(id, BTreeMap::from([(predicate.to_string(), children)]))
    }

    fn with_statements(statements: StatementMap) -> ContributionDefinition {
        ContributionDefinition {
            label: "Contribution".to_string(),
            classes: Default::default(),
            statements,
        }
    }

    #[tokio::test]
    async fn test_bakes_one_statement_per_edge_in_traversal_order() {
        let state = bake(testing::contribution()).await.unwrap();

        assert_eq!(
            state.baked_statements,
            vec![
                BakedStatement::new("^0", predicates::HAS_EVALUATION, "#temp1"),
                BakedStatement::new("^0", predicates::HAS_EVALUATION, "R3004"),
                BakedStatement::new("R3004", "#temp3", "R3003"),
                BakedStatement::new("R3004", "#temp4", "#temp2"),
                BakedStatement::new("^0", predicates::HAS_RESEARCH_PROBLEM, "R3003"),
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_ids_are_looked_up_once() {
        let (graph, baker) = baker(32);
        let command = command(testing::contribution());
        let state = prepared_state(&command.definitions);

        baker.run(&command, state).await.unwrap();

        // C2000, HAS_EVALUATION, R3004, R3003, P32
        assert_eq!(graph.lookup_count(), 5);
    }

    #[tokio::test]
    async fn test_placeholder_predicate_must_be_declared_as_predicate() {
        let err = bake(with_statements(BTreeMap::from([(
            "#temp1".to_string(),
            objects(&["R3003"]),
        )])))
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ThingIsNotAPredicate(id) if id == "#temp1"));
    }

    #[tokio::test]
    async fn test_existing_predicate_must_be_a_predicate() {
        let err = bake(with_statements(BTreeMap::from([(
            "R3004".to_string(),
            objects(&["R3003"]),
        )])))
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ThingIsNotAPredicate(id) if id == "R3004"));
    }

    #[tokio::test]
    async fn test_missing_predicate_is_not_found() {
        let err = bake(with_statements(BTreeMap::from([(
            "P404".to_string(),
            objects(&["R3003"]),
        )])))
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ThingNotFound(id) if id == "P404"));
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let err = bake(with_statements(BTreeMap::from([(
            predicates::HAS_EVALUATION.to_string(),
            objects(&["R404"]),
        )])))
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ThingNotFound(id) if id == "R404"));
    }

    #[tokio::test]
    async fn test_literal_placeholder_cannot_have_statements() {
        let err = bake(with_statements(BTreeMap::from([(
            predicates::HAS_EVALUATION.to_string(),
            vec![nested("#temp2", predicates::HAS_EVALUATION, objects(&["R3003"]))],
        )])))
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::InvalidStatementSubject(id) if id == "#temp2"));
    }

    #[tokio::test]
    async fn test_existing_literal_cannot_have_statements() {
        let err = bake(with_statements(BTreeMap::from([(
            predicates::HAS_EVALUATION.to_string(),
            vec![nested("L3005", predicates::HAS_EVALUATION, objects(&["R3003"]))],
        )])))
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::InvalidStatementSubject(id) if id == "L3005"));
    }

    #[tokio::test]
    async fn test_empty_contribution_is_rejected() {
        let err = bake(with_statements(StatementMap::new())).await.unwrap_err();
        assert!(matches!(err, AppError::EmptyContribution { index: None }));
    }

    #[tokio::test]
    async fn test_empty_contribution_names_its_index_in_papers() {
        let (_, baker) = baker(32);
        let mut paper = testing::paper_command();
        paper.contents = Some(PaperContents {
            definitions: testing::definitions(),
            contributions: vec![testing::contribution(), with_statements(StatementMap::new())],
        });
        let state = prepared_state(&testing::definitions());

        let err = baker.run(&paper, state).await.unwrap_err();
        assert!(matches!(err, AppError::EmptyContribution { index: Some(1) }));
    }

    #[tokio::test]
    async fn test_contribution_class_must_be_a_class() {
        let mut contribution = testing::contribution();
        contribution.classes = [ThingId::new("R3003")].into();

        let err = bake(contribution).await.unwrap_err();
        assert!(matches!(err, AppError::ThingIsNotAClass(id) if id == "R3003"));
    }

    #[tokio::test]
    async fn test_depth_is_bounded() {
        let (_, baker) = baker(2);
        let tree = nested(
            "R3004",
            predicates::HAS_EVALUATION,
            vec![nested("#temp1", predicates::HAS_EVALUATION, objects(&["R3003"]))],
        );
        let command = command(with_statements(BTreeMap::from([(
            predicates::HAS_EVALUATION.to_string(),
            vec![tree],
        )])));
        let state = prepared_state(&command.definitions);

        let err = baker.run(&command, state).await.unwrap_err();
        assert!(matches!(err, AppError::StatementDepthExceeded { max_depth: 2 }));
    }

    #[tokio::test]
    async fn test_re_expanding_a_node_on_its_path_is_a_cycle() {
        let tree = nested(
            "R3004",
            predicates::HAS_EVALUATION,
            vec![nested("R3004", predicates::HAS_EVALUATION, objects(&["R3003"]))],
        );

        let err = bake(with_statements(BTreeMap::from([(
            predicates::HAS_EVALUATION.to_string(),
            vec![tree],
        )])))
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::StatementCycle(id) if id == "R3004"));
    }

    #[tokio::test]
    async fn test_same_object_under_different_parents_is_not_a_cycle() {
        let state = bake(with_statements(BTreeMap::from([(
            predicates::HAS_EVALUATION.to_string(),
            vec![
                nested("R3004", predicates::HAS_EVALUATION, objects(&["R3003"])),
                nested("#temp1", predicates::HAS_EVALUATION, objects(&["R3003"])),
            ],
        )])))
        .await
        .unwrap();

        assert_eq!(state.baked_statements.len(), 4);
    }

    /// Nested subjects by depth, distinct so that no path revisits a node.
    const SUBJECTS: [&str; 3] = ["R3004", "#temp1", "R12"];
    const LEAVES: [&str; 4] = ["R3003", "L3005", "#temp1", "#temp2"];
    const PREDICATES: [&str; 4] = [
        predicates::HAS_EVALUATION,
        predicates::HAS_RESEARCH_PROBLEM,
        "#temp3",
        "#temp4",
    ];

    #[derive(Debug, Clone)]
    enum Shape {
        Leaf(usize),
        Node(Vec<Shape>),
    }

    fn shapes() -> impl Strategy<Value = Vec<Shape>> {
        let leaf = (0..LEAVES.len()).prop_map(Shape::Leaf);
        let tree = leaf.prop_recursive(2, 16, 3, |inner| {
            prop::collection::vec(inner, 1..4).prop_map(Shape::Node)
        });
        prop::collection::vec(tree, 1..5)
    }

    fn edge_count(shapes: &[Shape]) -> usize {
        shapes
            .iter()
            .map(|shape| match shape {
                Shape::Leaf(_) => 1,
                Shape::Node(children) => 1 + edge_count(children),
            })
            .sum()
    }

    fn statement_map(shapes: &[Shape], depth: usize) -> StatementMap {
        let mut statements = StatementMap::new();
        for (i, shape) in shapes.iter().enumerate() {
            let object = match shape {
                Shape::Leaf(leaf) => StatementObjectDefinition::new(LEAVES[*leaf]),
                Shape::Node(children) => StatementObjectDefinition::with_statements(
                    SUBJECTS[depth],
                    statement_map(children, depth + 1),
                ),
            };
            statements
                .entry(PREDICATES[i % PREDICATES.len()].to_string())
                .or_default()
                .push(object);
        }
        statements
    }

    proptest! {
        #[test]
        fn prop_bakes_one_statement_per_edge(shapes in shapes()) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let state = runtime
                .block_on(bake(with_statements(statement_map(&shapes, 0))))
                .unwrap();

            prop_assert_eq!(state.baked_statements.len(), edge_count(&shapes));
            let top_level = state
                .baked_statements
                .iter()
                .filter(|s| s.subject == "^0")
                .count();
            prop_assert_eq!(top_level, shapes.len());
        }
    }
}
