use super::link_literal;
use crate::error::AppError;
use crate::models::vocab::{datatypes, predicates};
use crate::models::ThingId;
use crate::repositories::{AppStore, CreateLiteral};

/// Attaches a free-text description to a thing.
#[derive(Clone)]
pub struct DescriptionCreator {
    store: AppStore,
}

impl DescriptionCreator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }

    /// Creates the description literal and links it from `subject`.
    pub async fn create(&self, subject: &ThingId, description: &str) -> Result<ThingId, AppError> {
        link_literal(
            &self.store,
            subject,
            predicates::DESCRIPTION,
            CreateLiteral::new(description, datatypes::STRING),
        )
        .await
    }
}
