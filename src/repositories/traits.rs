//! Narrow storage ports used by the pipeline stages.
//!
//! - [`ThingRepository`], [`ResourceRepository`], [`StatementRepository`] and
//!   [`CommunityRepository`] answer lookups
//! - [`ThingWriter`] and [`StatementWriter`] persist new things and triples
//! - [`GraphStore`] is the union, implemented for anything providing all ports

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{
    ObservatoryId, OrganizationId, Resource, ResourceMetadata, Statement, StatementId, Thing,
    ThingId,
};

/// Label search mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchString {
    /// Whole-label match after whitespace and case normalization.
    Exact(String),
    /// Case-insensitive substring match.
    Fuzzy(String),
}

impl SearchString {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            SearchString::Exact(query) => normalize(query) == normalize(label),
            SearchString::Fuzzy(query) => normalize(label).contains(&normalize(query)),
        }
    }
}

/// Collapses runs of whitespace and lowercases.
pub fn normalize(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateResource {
    pub label: String,
    pub classes: BTreeSet<ThingId>,
    pub metadata: ResourceMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLiteral {
    pub label: String,
    pub datatype: String,
}

impl CreateLiteral {
    pub fn new(label: impl Into<String>, datatype: &str) -> Self {
        Self {
            label: label.into(),
            datatype: datatype.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateList {
    pub label: String,
    pub elements: Vec<ThingId>,
}

#[async_trait]
pub trait ThingRepository: Send + Sync {
    /// Finds a thing of any kind.
    async fn find_by_thing_id(&self, id: &ThingId) -> Result<Option<Thing>, AppError>;
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn find_resource_by_id(&self, id: &ThingId) -> Result<Option<Resource>, AppError>;

    async fn find_all_by_class_and_label(
        &self,
        class: &ThingId,
        label: &SearchString,
    ) -> Result<Vec<Resource>, AppError>;
}

#[async_trait]
pub trait StatementRepository: Send + Sync {
    /// Statements using `predicate` whose object is a literal labelled
    /// `label` and whose subject is a resource of `subject_class`.
    async fn find_all_by_predicate_and_label_and_subject_class(
        &self,
        predicate: &ThingId,
        label: &str,
        subject_class: &ThingId,
    ) -> Result<Vec<Statement>, AppError>;

    async fn find_by_subject_predicate_object(
        &self,
        subject: &ThingId,
        predicate: &ThingId,
        object: &ThingId,
    ) -> Result<Option<Statement>, AppError>;
}

#[async_trait]
pub trait CommunityRepository: Send + Sync {
    async fn observatory_exists(&self, id: ObservatoryId) -> Result<bool, AppError>;

    async fn organization_exists(&self, id: OrganizationId) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ThingWriter: Send + Sync {
    async fn create_resource(&self, command: CreateResource) -> Result<ThingId, AppError>;

    async fn create_literal(&self, command: CreateLiteral) -> Result<ThingId, AppError>;

    async fn create_predicate(&self, label: String) -> Result<ThingId, AppError>;

    async fn create_list(&self, command: CreateList) -> Result<ThingId, AppError>;

    /// Replaces the elements of an existing list.
    async fn update_list(&self, id: &ThingId, elements: Vec<ThingId>) -> Result<(), AppError>;
}

#[async_trait]
pub trait StatementWriter: Send + Sync {
    async fn add_statement(
        &self,
        subject: ThingId,
        predicate: ThingId,
        object: ThingId,
    ) -> Result<StatementId, AppError>;
}

/// Every port the pipeline needs from a backing store.
pub trait GraphStore:
    ThingRepository
    + ResourceRepository
    + StatementRepository
    + CommunityRepository
    + ThingWriter
    + StatementWriter
{
}

impl<T> GraphStore for T where
    T: ThingRepository
        + ResourceRepository
        + StatementRepository
        + CommunityRepository
        + ThingWriter
        + StatementWriter
{
}
