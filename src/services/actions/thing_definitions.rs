//! Validation of the things a payload asks to create.

use async_trait::async_trait;

use super::{check_label, resolve, resolve_class};
use crate::config::LabelConfig;
use crate::error::AppError;
use crate::models::vocab::{classes, datatypes};
use crate::models::{ContentsCommand, LiteralDefinition, ThingDefinition, ThingDefinitions};
use crate::repositories::AppStore;
use crate::services::pipeline::{Action, PipelineStage, PipelineState, ValidatedId};

/// Registers every declared placeholder and resolves the concrete ids
/// referenced by the definitions (resource classes, list elements).
#[derive(Clone)]
pub struct ThingDefinitionValidator {
    store: AppStore,
    labels: LabelConfig,
}

impl ThingDefinitionValidator {
    pub fn new(store: AppStore, labels: LabelConfig) -> Self {
        Self { store, labels }
    }

    fn check_literal(&self, id: &str, literal: &LiteralDefinition) -> Result<(), AppError> {
        if !is_valid_datatype(&literal.data_type) {
            return Err(AppError::InvalidLiteralDatatype {
                id: id.to_string(),
                datatype: literal.data_type.clone(),
            });
        }
        if literal.label.chars().count() > self.labels.max_length {
            return Err(AppError::InvalidLiteralLabel {
                id: id.to_string(),
                reason: format!("longer than {} characters", self.labels.max_length),
            });
        }
        if !matches_datatype(&literal.label, &literal.data_type) {
            return Err(AppError::InvalidLiteralLabel {
                id: id.to_string(),
                reason: format!("\"{}\" is not a valid {}", literal.label, literal.data_type),
            });
        }
        Ok(())
    }

    async fn validate(
        &self,
        definitions: &ThingDefinitions,
        state: &mut PipelineState,
    ) -> Result<(), AppError> {
        for id in definitions.declared_temp_ids() {
            state
                .validated_ids
                .insert(id.to_string(), ValidatedId::TempId);
        }

        for (id, definition) in definitions.in_creation_order() {
            match definition {
                ThingDefinition::Literal(literal) => self.check_literal(id, literal)?,
                ThingDefinition::Predicate(predicate) => {
                    check_label(id, &predicate.label, &self.labels)?;
                    let too_long = predicate
                        .description
                        .as_ref()
                        .is_some_and(|d| d.chars().count() > self.labels.max_length);
                    if too_long {
                        return Err(AppError::InvalidLiteralLabel {
                            id: id.to_string(),
                            reason: format!(
                                "description longer than {} characters",
                                self.labels.max_length
                            ),
                        });
                    }
                }
                ThingDefinition::Resource(resource) => {
                    check_label(id, &resource.label, &self.labels)?;
                    for class in &resource.classes {
                        if classes::RESERVED.contains(&class.as_str()) {
                            return Err(AppError::ReservedClass(class.clone()));
                        }
                        resolve_class(&self.store, state, class).await?;
                    }
                }
                ThingDefinition::List(list) => {
                    check_label(id, &list.label, &self.labels)?;
                    for element in &list.elements {
                        if state.temp_ids.contains(element) {
                            continue;
                        }
                        if resolve(&self.store, &mut state.validated_ids, element)
                            .await?
                            .is_none()
                        {
                            return Err(AppError::ThingNotFound(element.clone()));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Accepts `xsd:` names and absolute URIs.
fn is_valid_datatype(datatype: &str) -> bool {
    if let Some(name) = datatype.strip_prefix("xsd:") {
        return !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric());
    }
    match datatype.split_once(':') {
        Some((scheme, rest)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && !rest.is_empty()
                && !rest.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Lexical checks for the numeric and boolean XSD types; other types accept
/// any label.
fn matches_datatype(label: &str, datatype: &str) -> bool {
    match datatype {
        datatypes::INTEGER | datatypes::INT | datatypes::LONG => label.parse::<i64>().is_ok(),
        datatypes::DECIMAL | datatypes::FLOAT | datatypes::DOUBLE => label.parse::<f64>().is_ok(),
        datatypes::BOOLEAN => matches!(label, "true" | "false" | "1" | "0"),
        _ => true,
    }
}

#[async_trait]
impl<C: ContentsCommand> Action<C> for ThingDefinitionValidator {
    fn name(&self) -> &'static str {
        "thing_definition_validator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ReferencesValidated
    }

    async fn run(&self, command: &C, mut state: PipelineState) -> Result<PipelineState, AppError> {
        if let Some(definitions) = command.definitions() {
            self.validate(definitions, &mut state).await?;
        }
        Ok(state)
    }
}
