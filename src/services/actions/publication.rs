//! Publication month, year, venue and url.

use async_trait::async_trait;

use super::link_literal;
use crate::error::AppError;
use crate::models::vocab::{classes, datatypes, predicates};
use crate::models::{ContentsCommand, CreatePaperCommand, ThingId};
use crate::repositories::{AppStore, CreateLiteral, CreateResource, SearchString};
use crate::services::pipeline::{Action, PipelineStage, PipelineState};

/// Checks the publication month and resolves `published_in` to an existing
/// venue by exact label.
#[derive(Clone)]
pub struct PublicationInfoValidator {
    store: AppStore,
}

impl PublicationInfoValidator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for PublicationInfoValidator {
    fn name(&self) -> &'static str {
        "publication_info_validator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ReferencesValidated
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        mut state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        if let Some(month) = command
            .publication_info
            .as_ref()
            .and_then(|info| info.published_month)
        {
            if !(1..=12).contains(&month) {
                return Err(AppError::InvalidMonth(month));
            }
        }

        let Some(venue) = command
            .publication_info
            .as_ref()
            .and_then(|info| info.published_in.as_deref())
        else {
            return Ok(state);
        };

        let mut matches = self
            .store
            .find_all_by_class_and_label(
                &ThingId::new(classes::VENUE),
                &SearchString::Exact(venue.to_string()),
            )
            .await?;

        match matches.len() {
            0 => tracing::debug!(venue = %venue, "Venue will be created"),
            1 => state.venue = matches.pop().map(|r| r.id),
            n => {
                return Err(AppError::AmbiguousReference {
                    kind: "venue",
                    label: venue.to_string(),
                    matches: n,
                })
            }
        }
        Ok(state)
    }
}

#[derive(Clone)]
pub struct PublicationInfoCreator {
    store: AppStore,
}

impl PublicationInfoCreator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action<CreatePaperCommand> for PublicationInfoCreator {
    fn name(&self) -> &'static str {
        "publication_info_creator"
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Materializing
    }

    async fn run(
        &self,
        command: &CreatePaperCommand,
        state: PipelineState,
    ) -> Result<PipelineState, AppError> {
        let Some(info) = &command.publication_info else {
            return Ok(state);
        };
        let root = state.root_id()?;

        if let Some(month) = info.published_month {
            link_literal(
                &self.store,
                root,
                predicates::MONTH_PUBLISHED,
                CreateLiteral::new(month.to_string(), datatypes::INTEGER),
            )
            .await?;
        }

        if let Some(year) = info.published_year {
            link_literal(
                &self.store,
                root,
                predicates::YEAR_PUBLISHED,
                CreateLiteral::new(year.to_string(), datatypes::INTEGER),
            )
            .await?;
        }

        if let Some(label) = &info.published_in {
            let venue = match &state.venue {
                Some(existing) => existing.clone(),
                None => {
                    self.store
                        .create_resource(CreateResource {
                            label: label.clone(),
                            classes: [ThingId::new(classes::VENUE)].into(),
                            metadata: command.metadata(),
                        })
                        .await?
                }
            };
            self.store
                .add_statement(root.clone(), ThingId::new(predicates::HAS_VENUE), venue)
                .await?;
        }

        if let Some(url) = &info.url {
            link_literal(
                &self.store,
                root,
                predicates::HAS_URL,
                CreateLiteral::new(url.as_str(), datatypes::ANY_URI),
            )
            .await?;
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PublicationInfo, Thing};
    use crate::repositories::WriteOperation;
    use crate::services::actions::testing;

    async fn validate(venues: &[(&str, &str)]) -> Result<PipelineState, AppError> {
        let snapshot = venues.iter().fold(testing::snapshot(), |s, (id, label)| {
            s.with_resource(id, label, &[classes::VENUE])
        });
        let (_, store) = testing::store(snapshot);
        PublicationInfoValidator::new(store)
            .run(&testing::paper_command(), PipelineState::default())
            .await
    }

    #[tokio::test]
    async fn test_unknown_venue_is_left_for_creation() {
        let state = validate(&[]).await.unwrap();
        assert_eq!(state.venue, None);
    }

    #[tokio::test]
    async fn test_single_venue_match_is_reused() {
        let state = validate(&[("R900", "neurips")]).await.unwrap();
        assert_eq!(state.venue, Some(ThingId::new("R900")));
    }

    #[tokio::test]
    async fn test_several_venue_matches_are_ambiguous() {
        let err = validate(&[("R900", "NeurIPS"), ("R901", "NeurIPS")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::AmbiguousReference { kind: "venue", matches: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_month_out_of_range_is_rejected_before_lookup() {
        for month in [0, 13] {
            let (graph, store) = testing::store(testing::snapshot());
            let mut command = testing::paper_command();
            if let Some(info) = command.publication_info.as_mut() {
                info.published_month = Some(month);
            }

            let err = PublicationInfoValidator::new(store)
                .run(&command, PipelineState::default())
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::InvalidMonth(m) if m == month));
            assert_eq!(graph.lookup_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_month_bounds_are_accepted() {
        for month in [1, 12] {
            let (_, store) = testing::store(testing::snapshot());
            let mut command = testing::paper_command();
            if let Some(info) = command.publication_info.as_mut() {
                info.published_month = Some(month);
            }

            assert!(PublicationInfoValidator::new(store)
                .run(&command, PipelineState::default())
                .await
                .is_ok());
        }
    }

    #[tokio::test]
    async fn test_creator_links_every_present_field() {
        let (graph, store) = testing::store(testing::snapshot());
        let state = PipelineState {
            root_id: Some(ThingId::new("R3004")),
            ..PipelineState::default()
        };

        PublicationInfoCreator::new(store.clone())
            .run(&testing::paper_command(), state)
            .await
            .unwrap();

        let snapshot = graph.snapshot().unwrap();
        let linked: Vec<_> = snapshot
            .statements
            .iter()
            .filter(|s| s.subject.as_str() == "R3004")
            .map(|s| s.predicate.as_str())
            .collect();
        assert_eq!(
            linked,
            vec![
                predicates::MONTH_PUBLISHED,
                predicates::YEAR_PUBLISHED,
                predicates::HAS_VENUE,
                predicates::HAS_URL,
            ]
        );

        let venue = &snapshot.statements[2].object;
        let created = store.find_by_thing_id(venue).await.unwrap();
        assert!(matches!(
            created,
            Some(Thing::Resource(r)) if r.label == "NeurIPS" && r.has_class(&ThingId::new(classes::VENUE))
        ));

        let month = store.find_by_thing_id(&snapshot.statements[0].object).await.unwrap();
        assert!(matches!(
            month,
            Some(Thing::Literal(l)) if l.label == "6" && l.datatype == datatypes::INTEGER
        ));
    }

    #[tokio::test]
    async fn test_creator_reuses_resolved_venue() {
        let (graph, store) = testing::store(
            testing::snapshot().with_resource("R900", "NeurIPS", &[classes::VENUE]),
        );
        let command = CreatePaperCommand {
            publication_info: Some(PublicationInfo {
                published_in: Some("NeurIPS".to_string()),
                ..PublicationInfo::default()
            }),
            ..testing::paper_command()
        };
        let state = PipelineState {
            root_id: Some(ThingId::new("R3004")),
            venue: Some(ThingId::new("R900")),
            ..PipelineState::default()
        };

        PublicationInfoCreator::new(store)
            .run(&command, state)
            .await
            .unwrap();

        assert_eq!(
            graph.operations().unwrap(),
            vec![WriteOperation::AddStatement {
                subject: ThingId::new("R3004"),
                predicate: ThingId::new(predicates::HAS_VENUE),
                object: ThingId::new("R900"),
            }]
        );
    }
}
