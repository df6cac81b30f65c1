//! In-memory graph store.
//!
//! Backs the CLI (through JSON snapshots) and the test suites. Every write is
//! appended to an operation log so callers can assert creation order.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::traits::{
    CommunityRepository, CreateList, CreateLiteral, CreateResource, ResourceRepository,
    SearchString, StatementRepository, StatementWriter, ThingRepository, ThingWriter,
};
use crate::error::AppError;
use crate::models::vocab::{classes, predicates};
use crate::models::{
    Class, GraphList, Literal, ObservatoryId, OrganizationId, Predicate, Resource,
    ResourceMetadata, Statement, StatementId, Thing, ThingId,
};

/// Serializable contents of a [`MemoryGraph`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub resources: BTreeMap<ThingId, Resource>,
    #[serde(default)]
    pub classes: BTreeMap<ThingId, Class>,
    #[serde(default)]
    pub predicates: BTreeMap<ThingId, Predicate>,
    #[serde(default)]
    pub literals: BTreeMap<ThingId, Literal>,
    #[serde(default)]
    pub lists: BTreeMap<ThingId, GraphList>,
    #[serde(default)]
    pub statements: Vec<Statement>,
    #[serde(default)]
    pub observatories: BTreeSet<ObservatoryId>,
    #[serde(default)]
    pub organizations: BTreeSet<OrganizationId>,
}

impl GraphSnapshot {
    /// A snapshot holding the built-in classes and predicates.
    pub fn seeded() -> Self {
        let snapshot = classes::BUILT_IN
            .iter()
            .fold(Self::default(), |s, (id, label)| s.with_class(id, label));
        predicates::BUILT_IN
            .iter()
            .fold(snapshot, |s, (id, label)| s.with_predicate(id, label))
    }

    pub fn with_class(mut self, id: &str, label: &str) -> Self {
        let id = ThingId::new(id);
        self.classes.insert(
            id.clone(),
            Class {
                id,
                label: label.to_string(),
                uri: None,
                created_at: Utc::now(),
            },
        );
        self
    }

    pub fn with_predicate(mut self, id: &str, label: &str) -> Self {
        let id = ThingId::new(id);
        self.predicates.insert(
            id.clone(),
            Predicate {
                id,
                label: label.to_string(),
                created_at: Utc::now(),
            },
        );
        self
    }

    pub fn with_resource(mut self, id: &str, label: &str, class_ids: &[&str]) -> Self {
        let id = ThingId::new(id);
        self.resources.insert(
            id.clone(),
            Resource {
                id,
                label: label.to_string(),
                classes: class_ids.iter().map(|c| ThingId::new(*c)).collect(),
                metadata: ResourceMetadata::default(),
                created_at: Utc::now(),
            },
        );
        self
    }

    pub fn with_literal(mut self, id: &str, label: &str, datatype: &str) -> Self {
        let id = ThingId::new(id);
        self.literals.insert(
            id.clone(),
            Literal {
                id,
                label: label.to_string(),
                datatype: datatype.to_string(),
                created_at: Utc::now(),
            },
        );
        self
    }

    pub fn with_statement(mut self, id: &str, subject: &str, predicate: &str, object: &str) -> Self {
        self.statements.push(Statement {
            id: StatementId::new(id),
            subject: ThingId::new(subject),
            predicate: ThingId::new(predicate),
            object: ThingId::new(object),
            created_at: Utc::now(),
        });
        self
    }

    pub fn with_observatory(mut self, id: ObservatoryId) -> Self {
        self.observatories.insert(id);
        self
    }

    pub fn with_organization(mut self, id: OrganizationId) -> Self {
        self.organizations.insert(id);
        self
    }

    fn thing(&self, id: &ThingId) -> Option<Thing> {
        if let Some(r) = self.resources.get(id) {
            return Some(Thing::Resource(r.clone()));
        }
        if let Some(c) = self.classes.get(id) {
            return Some(Thing::Class(c.clone()));
        }
        if let Some(p) = self.predicates.get(id) {
            return Some(Thing::Predicate(p.clone()));
        }
        if let Some(l) = self.literals.get(id) {
            return Some(Thing::Literal(l.clone()));
        }
        self.lists.get(id).map(|l| Thing::List(l.clone()))
    }

    fn contains(&self, id: &ThingId) -> bool {
        self.resources.contains_key(id)
            || self.classes.contains_key(id)
            || self.predicates.contains_key(id)
            || self.literals.contains_key(id)
            || self.lists.contains_key(id)
    }
}

/// A write applied to the store, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOperation {
    CreateResource(ThingId),
    CreateLiteral(ThingId),
    CreatePredicate(ThingId),
    CreateList(ThingId),
    UpdateList(ThingId),
    AddStatement {
        subject: ThingId,
        predicate: ThingId,
        object: ThingId,
    },
}

#[derive(Debug)]
struct State {
    graph: GraphSnapshot,
    log: Vec<WriteOperation>,
    next_id: u64,
    fail_after_writes: Option<usize>,
}

impl State {
    fn allocate_id(&mut self, prefix: char) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{prefix}{}", self.next_id);
            let taken = self.graph.contains(&ThingId::new(id.as_str()))
                || self.graph.statements.iter().any(|s| s.id.as_str() == id);
            if !taken {
                return id;
            }
        }
    }

    fn check_write_allowed(&self) -> Result<(), AppError> {
        match self.fail_after_writes {
            Some(limit) if self.log.len() >= limit => Err(AppError::Storage(format!(
                "write rejected after {limit} operations"
            ))),
            _ => Ok(()),
        }
    }
}

/// Thread-safe in-memory [`GraphStore`](super::GraphStore).
#[derive(Debug)]
pub struct MemoryGraph {
    state: RwLock<State>,
    lookups: AtomicUsize,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::from_snapshot(GraphSnapshot::default())
    }
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the built-in vocabulary.
    pub fn seeded() -> Self {
        Self::from_snapshot(GraphSnapshot::seeded())
    }

    pub fn from_snapshot(graph: GraphSnapshot) -> Self {
        Self {
            state: RwLock::new(State {
                graph,
                log: Vec::new(),
                next_id: 0,
                fail_after_writes: None,
            }),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Makes every write after the first `limit` fail with a storage error.
    pub fn fail_after_writes(self, limit: usize) -> Self {
        let mut state = match self.state.into_inner() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.fail_after_writes = Some(limit);
        Self {
            state: RwLock::new(state),
            lookups: self.lookups,
        }
    }

    pub fn snapshot(&self) -> Result<GraphSnapshot, AppError> {
        Ok(self.read()?.graph.clone())
    }

    pub fn operations(&self) -> Result<Vec<WriteOperation>, AppError> {
        Ok(self.read()?.log.clone())
    }

    /// Number of read calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, AppError> {
        self.state
            .read()
            .map_err(|_| AppError::Storage("graph lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, AppError> {
        self.state
            .write()
            .map_err(|_| AppError::Storage("graph lock poisoned".to_string()))
    }

    fn lookup(&self) -> Result<RwLockReadGuard<'_, State>, AppError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.read()
    }
}

#[async_trait]
impl ThingRepository for MemoryGraph {
    async fn find_by_thing_id(&self, id: &ThingId) -> Result<Option<Thing>, AppError> {
        Ok(self.lookup()?.graph.thing(id))
    }
}

#[async_trait]
impl ResourceRepository for MemoryGraph {
    async fn find_resource_by_id(&self, id: &ThingId) -> Result<Option<Resource>, AppError> {
        Ok(self.lookup()?.graph.resources.get(id).cloned())
    }

    async fn find_all_by_class_and_label(
        &self,
        class: &ThingId,
        label: &SearchString,
    ) -> Result<Vec<Resource>, AppError> {
        let state = self.lookup()?;
        Ok(state
            .graph
            .resources
            .values()
            .filter(|r| r.has_class(class) && label.matches(&r.label))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatementRepository for MemoryGraph {
    async fn find_all_by_predicate_and_label_and_subject_class(
        &self,
        predicate: &ThingId,
        label: &str,
        subject_class: &ThingId,
    ) -> Result<Vec<Statement>, AppError> {
        let state = self.lookup()?;
        let graph = &state.graph;
        Ok(graph
            .statements
            .iter()
            .filter(|s| &s.predicate == predicate)
            .filter(|s| {
                graph
                    .literals
                    .get(&s.object)
                    .is_some_and(|literal| literal.label == label)
            })
            .filter(|s| {
                graph
                    .resources
                    .get(&s.subject)
                    .is_some_and(|subject| subject.has_class(subject_class))
            })
            .cloned()
            .collect())
    }

    async fn find_by_subject_predicate_object(
        &self,
        subject: &ThingId,
        predicate: &ThingId,
        object: &ThingId,
    ) -> Result<Option<Statement>, AppError> {
        let state = self.lookup()?;
        Ok(state
            .graph
            .statements
            .iter()
            .find(|s| &s.subject == subject && &s.predicate == predicate && &s.object == object)
            .cloned())
    }
}

#[async_trait]
impl CommunityRepository for MemoryGraph {
    async fn observatory_exists(&self, id: ObservatoryId) -> Result<bool, AppError> {
        Ok(self.lookup()?.graph.observatories.contains(&id))
    }

    async fn organization_exists(&self, id: OrganizationId) -> Result<bool, AppError> {
        Ok(self.lookup()?.graph.organizations.contains(&id))
    }
}

#[async_trait]
impl ThingWriter for MemoryGraph {
    async fn create_resource(&self, command: CreateResource) -> Result<ThingId, AppError> {
        let mut state = self.write()?;
        state.check_write_allowed()?;
        if let Some(missing) = command
            .classes
            .iter()
            .find(|c| !state.graph.classes.contains_key(*c))
        {
            return Err(AppError::Storage(format!("unknown class \"{missing}\"")));
        }

        let id = ThingId::new(state.allocate_id('R'));
        state.graph.resources.insert(
            id.clone(),
            Resource {
                id: id.clone(),
                label: command.label,
                classes: command.classes,
                metadata: command.metadata,
                created_at: Utc::now(),
            },
        );
        state.log.push(WriteOperation::CreateResource(id.clone()));
        Ok(id)
    }

    async fn create_literal(&self, command: CreateLiteral) -> Result<ThingId, AppError> {
        let mut state = self.write()?;
        state.check_write_allowed()?;

        let id = ThingId::new(state.allocate_id('L'));
        state.graph.literals.insert(
            id.clone(),
            Literal {
                id: id.clone(),
                label: command.label,
                datatype: command.datatype,
                created_at: Utc::now(),
            },
        );
        state.log.push(WriteOperation::CreateLiteral(id.clone()));
        Ok(id)
    }

    async fn create_predicate(&self, label: String) -> Result<ThingId, AppError> {
        let mut state = self.write()?;
        state.check_write_allowed()?;

        let id = ThingId::new(state.allocate_id('P'));
        state.graph.predicates.insert(
            id.clone(),
            Predicate {
                id: id.clone(),
                label,
                created_at: Utc::now(),
            },
        );
        state.log.push(WriteOperation::CreatePredicate(id.clone()));
        Ok(id)
    }

    async fn create_list(&self, command: CreateList) -> Result<ThingId, AppError> {
        let mut state = self.write()?;
        state.check_write_allowed()?;
        if let Some(missing) = command.elements.iter().find(|e| !state.graph.contains(e)) {
            return Err(AppError::Storage(format!("unknown list element \"{missing}\"")));
        }

        let id = ThingId::new(state.allocate_id('R'));
        state.graph.lists.insert(
            id.clone(),
            GraphList {
                id: id.clone(),
                label: command.label,
                elements: command.elements,
                created_at: Utc::now(),
            },
        );
        state.log.push(WriteOperation::CreateList(id.clone()));
        Ok(id)
    }

    async fn update_list(&self, id: &ThingId, elements: Vec<ThingId>) -> Result<(), AppError> {
        let mut state = self.write()?;
        state.check_write_allowed()?;
        if let Some(missing) = elements.iter().find(|e| !state.graph.contains(e)) {
            return Err(AppError::Storage(format!("unknown list element \"{missing}\"")));
        }

        let list = state
            .graph
            .lists
            .get_mut(id)
            .ok_or_else(|| AppError::Storage(format!("unknown list \"{id}\"")))?;
        list.elements = elements;
        state.log.push(WriteOperation::UpdateList(id.clone()));
        Ok(())
    }
}

#[async_trait]
impl StatementWriter for MemoryGraph {
    async fn add_statement(
        &self,
        subject: ThingId,
        predicate: ThingId,
        object: ThingId,
    ) -> Result<StatementId, AppError> {
        let mut state = self.write()?;
        state.check_write_allowed()?;
        if !state.graph.predicates.contains_key(&predicate) {
            return Err(AppError::Storage(format!("unknown predicate \"{predicate}\"")));
        }
        if let Some(missing) = [&subject, &object]
            .into_iter()
            .find(|id| !state.graph.contains(id))
        {
            return Err(AppError::Storage(format!("unknown statement endpoint \"{missing}\"")));
        }

        let id = StatementId::new(state.allocate_id('S'));
        state.graph.statements.push(Statement {
            id: id.clone(),
            subject: subject.clone(),
            predicate: predicate.clone(),
            object: object.clone(),
            created_at: Utc::now(),
        });
        state.log.push(WriteOperation::AddStatement {
            subject,
            predicate,
            object,
        });
        Ok(id)
    }
}
