//! Placeholder syntax and uniqueness.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::config::PipelineConfig;
use crate::error::AppError;
use crate::models::ContentsCommand;
use crate::services::pipeline::{Action, PipelineStage, PipelineState};

/// Rejects malformed placeholders and placeholders declared more than once.
#[derive(Debug, Clone)]
pub struct TempIdValidator {
    prefix: String,
    min_length: usize,
}

impl TempIdValidator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            prefix: config.temp_id_prefix.clone(),
            min_length: config.temp_id_min_length,
        }
    }

    fn is_well_formed(&self, id: &str) -> bool {
        id.chars().count() >= self.min_length && id.starts_with(&self.prefix)
    }

    /// Validates every declared placeholder (one entry per declaration) and
    /// returns the distinct set.
    pub fn validate<'a>(
        &self,
        declared: impl IntoIterator<Item = &'a str>,
    ) -> Result<BTreeSet<String>, AppError> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for id in declared {
            *counts.entry(id.to_string()).or_default() += 1;
        }

        let invalid: Vec<String> = counts
            .keys()
            .filter(|id| !self.is_well_formed(id))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            return Err(AppError::InvalidTempId {
                ids: invalid,
                prefix: self.prefix.clone(),
                min_length: self.min_length,
            });
        }

        let duplicates: BTreeMap<String, usize> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(id, count)| (id.clone(), *count))
            .collect();
        if !duplicates.is_empty() {
            return Err(AppError::DuplicateTempIds { duplicates });
        }

        Ok(counts.into_keys().collect())
    }
}

#[async_trait]
impl<C: ContentsCommand> Action<C> for TempIdValidator {
    fn name(&self) -> &'static str {
        "temp_id_validator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::TempIdsValidated
    }

    async fn run(&self, command: &C, mut state: PipelineState) -> Result<PipelineState, AppError> {
        if let Some(definitions) = command.definitions() {
            state.temp_ids = self.validate(definitions.declared_temp_ids())?;
        }
        tracing::debug!(count = state.temp_ids.len(), "Temp ids validated");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn validator() -> TempIdValidator {
        TempIdValidator::new(&PipelineConfig::default())
    }

    #[test]
    fn test_accepts_distinct_well_formed_ids() {
        let ids = validator().validate(["#temp1", "#temp2"]).unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_reports_every_invalid_id() {
        let err = validator().validate(["temp1", "#", "#ok", "R1"]).unwrap_err();

        match err {
            AppError::InvalidTempId { ids, .. } => assert_eq!(ids, vec!["#", "R1", "temp1"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reports_exact_duplicate_counts() {
        let err = validator()
            .validate(["#a", "#b", "#a", "#c", "#a", "#b"])
            .unwrap_err();

        match err {
            AppError::DuplicateTempIds { duplicates } => {
                assert_eq!(
                    duplicates,
                    BTreeMap::from([("#a".to_string(), 3), ("#b".to_string(), 2)])
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_shape_errors_win_over_duplicates() {
        let err = validator().validate(["x", "#a", "#a"]).unwrap_err();
        assert!(matches!(err, AppError::InvalidTempId { .. }));
    }

    #[test]
    fn test_custom_prefix_and_length() {
        let validator = TempIdValidator::new(&PipelineConfig {
            temp_id_prefix: "_:".to_string(),
            temp_id_min_length: 4,
            ..PipelineConfig::default()
        });

        assert!(validator.validate(["_:b1"]).is_ok());
        assert!(validator.validate(["_:b"]).is_err());
        assert!(validator.validate(["#b12"]).is_err());
    }

    proptest! {
        #[test]
        fn prop_succeeds_iff_well_formed_and_unique(
            tokens in prop::collection::vec("#?[a-z0-9]{0,3}", 0..12)
        ) {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for token in &tokens {
                *counts.entry(token.as_str()).or_default() += 1;
            }
            let well_formed = tokens.iter().all(|t| t.len() >= 2 && t.starts_with('#'));
            let unique = counts.values().all(|c| *c == 1);

            let result = validator().validate(tokens.iter().map(String::as_str));

            prop_assert_eq!(result.is_ok(), well_formed && unique);
            if let Err(AppError::DuplicateTempIds { duplicates }) = result {
                for (id, count) in duplicates {
                    prop_assert_eq!(counts[id.as_str()], count);
                }
            }
        }
    }
}
