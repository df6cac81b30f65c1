//! Application error types with stable failure codes.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::models::{ObservatoryId, OrganizationId, ThingId};

/// What an already-existing paper was matched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistingPaper {
    Title(String),
    Identifier { key: String, value: String },
}

impl fmt::Display for ExistingPaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExistingPaper::Title(title) => write!(f, "title \"{title}\""),
            ExistingPaper::Identifier { key, value } => write!(f, "{key} \"{value}\""),
        }
    }
}

fn join_duplicates(duplicates: &BTreeMap<String, usize>) -> String {
    duplicates
        .iter()
        .map(|(id, count)| format!("{id}={count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn contribution_position(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at index \"{i}\""),
        None => String::new(),
    }
}

/// Application-level errors for the content pipeline.
#[derive(Error, Debug)]
pub enum AppError {
    // Temp id errors
    #[error("Invalid temp ids: {}. Requires \"{prefix}\" as prefix and at least {min_length} characters.", .ids.join(", "))]
    InvalidTempId {
        ids: Vec<String>,
        prefix: String,
        min_length: usize,
    },

    #[error("Duplicate temp ids: {}", join_duplicates(.duplicates))]
    DuplicateTempIds { duplicates: BTreeMap<String, usize> },

    // Reference errors
    #[error("Thing \"{0}\" not found.")]
    ThingNotFound(String),

    #[error("Thing \"{0}\" is not a class.")]
    ThingIsNotAClass(String),

    #[error("Thing \"{0}\" is not a predicate.")]
    ThingIsNotAPredicate(String),

    #[error("Invalid statement subject \"{0}\".")]
    InvalidStatementSubject(String),

    #[error("Class \"{0}\" is reserved and cannot be assigned.")]
    ReservedClass(ThingId),

    #[error("Contribution{} does not contain any statements.", contribution_position(.index))]
    EmptyContribution { index: Option<usize> },

    #[error("Statement tree revisits \"{0}\" on its own expansion path.")]
    StatementCycle(String),

    #[error("Statement tree exceeds the maximum depth of {max_depth}.")]
    StatementDepthExceeded { max_depth: usize },

    // Label errors
    #[error("Invalid label for \"{id}\".")]
    InvalidLabel { id: String },

    #[error("Invalid literal label for \"{id}\": {reason}")]
    InvalidLiteralLabel { id: String, reason: String },

    #[error("Invalid datatype \"{datatype}\" for literal \"{id}\".")]
    InvalidLiteralDatatype { id: String, datatype: String },

    // Author errors
    #[error("Author \"{0}\" not found.")]
    AuthorNotFound(ThingId),

    #[error("Ambiguous author \"{name}\": its id and identifiers resolve to different authors.")]
    AmbiguousAuthor { name: String },

    #[error("Ambiguous {kind} reference \"{label}\": {matches} candidates match.")]
    AmbiguousReference {
        kind: &'static str,
        label: String,
        matches: usize,
    },

    // Community and research field errors
    #[error("Research field \"{0}\" not found.")]
    ResearchFieldNotFound(ThingId),

    #[error("Observatory \"{0}\" not found.")]
    ObservatoryNotFound(ObservatoryId),

    #[error("Organization \"{0}\" not found.")]
    OrganizationNotFound(OrganizationId),

    #[error("Only one research field is allowed.")]
    OnlyOneResearchFieldAllowed,

    #[error("Only one observatory is allowed.")]
    OnlyOneObservatoryAllowed,

    #[error("Only one organization is allowed.")]
    OnlyOneOrganizationAllowed,

    // Paper errors
    #[error("Paper \"{0}\" not found.")]
    PaperNotFound(ThingId),

    #[error("Paper with {0} already exists.")]
    PaperAlreadyExists(ExistingPaper),

    #[error("Invalid identifier \"{value}\" for \"{field}\".")]
    InvalidIdentifier { field: String, value: String },

    #[error("Invalid publication month \"{0}\". Must be in range [1..12].")]
    InvalidMonth(u8),

    // Infrastructure errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, distinct per variant.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidTempId { .. } => "INVALID_TEMP_ID",
            AppError::DuplicateTempIds { .. } => "DUPLICATE_TEMP_IDS",
            AppError::ThingNotFound(_) => "THING_NOT_FOUND",
            AppError::ThingIsNotAClass(_) => "THING_IS_NOT_A_CLASS",
            AppError::ThingIsNotAPredicate(_) => "THING_IS_NOT_A_PREDICATE",
            AppError::InvalidStatementSubject(_) => "INVALID_STATEMENT_SUBJECT",
            AppError::ReservedClass(_) => "RESERVED_CLASS",
            AppError::EmptyContribution { .. } => "EMPTY_CONTRIBUTION",
            AppError::StatementCycle(_) => "STATEMENT_CYCLE",
            AppError::StatementDepthExceeded { .. } => "STATEMENT_DEPTH_EXCEEDED",
            AppError::InvalidLabel { .. } => "INVALID_LABEL",
            AppError::InvalidLiteralLabel { .. } => "INVALID_LITERAL_LABEL",
            AppError::InvalidLiteralDatatype { .. } => "INVALID_LITERAL_DATATYPE",
            AppError::AuthorNotFound(_) => "AUTHOR_NOT_FOUND",
            AppError::AmbiguousAuthor { .. } => "AMBIGUOUS_AUTHOR",
            AppError::AmbiguousReference { .. } => "AMBIGUOUS_REFERENCE",
            AppError::ResearchFieldNotFound(_) => "RESEARCH_FIELD_NOT_FOUND",
            AppError::ObservatoryNotFound(_) => "OBSERVATORY_NOT_FOUND",
            AppError::OrganizationNotFound(_) => "ORGANIZATION_NOT_FOUND",
            AppError::OnlyOneResearchFieldAllowed => "ONLY_ONE_RESEARCH_FIELD_ALLOWED",
            AppError::OnlyOneObservatoryAllowed => "ONLY_ONE_OBSERVATORY_ALLOWED",
            AppError::OnlyOneOrganizationAllowed => "ONLY_ONE_ORGANIZATION_ALLOWED",
            AppError::PaperNotFound(_) => "PAPER_NOT_FOUND",
            AppError::PaperAlreadyExists(_) => "PAPER_ALREADY_EXISTS",
            AppError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            AppError::InvalidMonth(_) => "INVALID_MONTH",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error was caused by the submitted payload rather than
    /// by the environment.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::Storage(_) | AppError::Config(_) | AppError::Internal(_)
        )
    }
}
