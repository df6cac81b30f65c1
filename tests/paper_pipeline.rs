//! End-to-end pipeline runs against the in-memory graph.

use std::sync::Arc;

use contentgraph::config::Config;
use contentgraph::context::Context;
use contentgraph::error::{AppError, ExistingPaper};
use contentgraph::models::vocab::{classes, predicates};
use contentgraph::models::{CreateContributionCommand, CreatePaperCommand, Thing, ThingId};
use contentgraph::repositories::{AppStore, GraphSnapshot, MemoryGraph, ThingRepository};
use contentgraph::services::PaperService;
use contentgraph::FromRef;
use serde_json::json;

fn snapshot() -> GraphSnapshot {
    GraphSnapshot::seeded()
        .with_resource("R12", "Computer Science", &[classes::RESEARCH_FIELD])
        .with_resource("R3003", "Machine translation", &[classes::PROBLEM])
        .with_resource("R500", "Existing Author", &[classes::AUTHOR])
        .with_resource("R501", "Other Author", &[classes::AUTHOR])
        .with_literal("L500", "0000-0002-1825-0097", "xsd:string")
        .with_statement("S500", "R501", predicates::HAS_ORCID, "L500")
        .with_class("C2000", "Method")
}

fn setup(graph: MemoryGraph) -> (Arc<MemoryGraph>, PaperService) {
    let graph = Arc::new(graph);
    let store: AppStore = graph.clone();
    let ctx = Context::with_store(store, Config::default());
    (graph, PaperService::from_ref(&ctx))
}

fn paper_payload() -> serde_json::Value {
    json!({
        "title": "Attention Is All You Need",
        "research_fields": ["R12"],
        "identifiers": { "doi": "10.48550/arXiv.1706.03762" },
        "publication_info": {
            "published_month": 6,
            "published_year": 2017,
            "published_in": "NeurIPS",
            "url": "https://arxiv.org/abs/1706.03762"
        },
        "authors": [
            { "name": "Ashish Vaswani" },
            { "name": "Noam Shazeer", "homepage": "https://example.org/noam" }
        ],
        "extraction_method": "MANUAL",
        "contents": {
            "resources": { "#method": { "label": "Transformer", "classes": ["C2000"] } },
            "literals": { "#score": { "label": "28.4", "data_type": "xsd:decimal" } },
            "predicates": { "#bleu": { "label": "BLEU score", "description": "BLEU on WMT 2014" } },
            "contributions": [{
                "label": "Contribution 1",
                "statements": {
                    "P32": [{ "id": "R3003" }],
                    "HAS_EVALUATION": [{
                        "id": "#method",
                        "statements": { "#bleu": [{ "id": "#score" }] }
                    }]
                }
            }]
        }
    })
}

fn paper_command() -> CreatePaperCommand {
    serde_json::from_value(paper_payload()).unwrap()
}

fn objects_of<'a>(snapshot: &'a GraphSnapshot, subject: &ThingId, predicate: &str) -> Vec<&'a ThingId> {
    snapshot
        .statements
        .iter()
        .filter(|s| &s.subject == subject && s.predicate.as_str() == predicate)
        .map(|s| &s.object)
        .collect()
}

#[tokio::test]
async fn test_create_paper_materializes_everything() {
    let (graph, service) = setup(MemoryGraph::from_snapshot(snapshot()));

    let paper_id = service.create(&paper_command()).await.unwrap();

    let snapshot = graph.snapshot().unwrap();
    let paper = &snapshot.resources[&paper_id];
    assert_eq!(paper.label, "Attention Is All You Need");
    assert!(paper.has_class(&ThingId::new(classes::PAPER)));

    assert_eq!(
        objects_of(&snapshot, &paper_id, predicates::HAS_RESEARCH_FIELD),
        vec![&ThingId::new("R12")]
    );

    let authors = objects_of(&snapshot, &paper_id, predicates::HAS_AUTHORS);
    assert_eq!(authors.len(), 1);
    assert_eq!(snapshot.lists[authors[0]].elements.len(), 2);

    let contributions = objects_of(&snapshot, &paper_id, predicates::HAS_CONTRIBUTION);
    assert_eq!(contributions.len(), 1);
    let contribution = contributions[0];
    assert!(snapshot.resources[contribution].has_class(&ThingId::new(classes::CONTRIBUTION)));
    assert_eq!(
        objects_of(&snapshot, contribution, predicates::HAS_RESEARCH_PROBLEM),
        vec![&ThingId::new("R3003")]
    );

    let methods = objects_of(&snapshot, contribution, predicates::HAS_EVALUATION);
    let method = &snapshot.resources[methods[0]];
    assert_eq!(method.label, "Transformer");

    let score_edge = snapshot
        .statements
        .iter()
        .find(|s| s.subject == method.id)
        .unwrap();
    assert_eq!(snapshot.predicates[&score_edge.predicate].label, "BLEU score");
    assert_eq!(snapshot.literals[&score_edge.object].label, "28.4");
    assert_eq!(
        objects_of(&snapshot, &score_edge.predicate, predicates::DESCRIPTION).len(),
        1
    );
}

#[tokio::test]
async fn test_second_paper_with_same_title_is_rejected() {
    let (graph, service) = setup(MemoryGraph::from_snapshot(snapshot()));
    let mut command = paper_command();
    command.identifiers.clear();
    service.create(&command).await.unwrap();
    let writes = graph.operations().unwrap().len();

    command.title = "attention is all   you need".to_string();
    let err = service.create(&command).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::PaperAlreadyExists(ExistingPaper::Title(_))
    ));
    assert_eq!(err.code(), "PAPER_ALREADY_EXISTS");
    assert_eq!(graph.operations().unwrap().len(), writes);
}

#[tokio::test]
async fn test_conflicting_author_fails_before_any_write() {
    let (graph, service) = setup(MemoryGraph::from_snapshot(snapshot()));
    let mut payload = paper_payload();
    payload["authors"] = json!([{
        "id": "R500",
        "name": "Existing Author",
        "identifiers": { "orcid": ["0000-0002-1825-0097"] }
    }]);
    let command: CreatePaperCommand = serde_json::from_value(payload).unwrap();

    let err = service.create(&command).await.unwrap_err();

    assert!(matches!(err, AppError::AmbiguousAuthor { .. }));
    assert!(graph.operations().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_payload_fields_fail_before_any_write() {
    let cases = [
        ("/publication_info/published_month", json!(13), "INVALID_MONTH"),
        ("/title", json!("  \n "), "INVALID_LABEL"),
        ("/authors", json!([{ "name": "\n" }]), "INVALID_LABEL"),
    ];

    for (pointer, value, code) in cases {
        let (graph, service) = setup(MemoryGraph::from_snapshot(snapshot()));
        let mut payload = paper_payload();
        *payload.pointer_mut(pointer).unwrap() = value;
        let command: CreatePaperCommand = serde_json::from_value(payload).unwrap();

        let err = service.create(&command).await.unwrap_err();

        assert_eq!(err.code(), code, "{pointer}");
        assert!(graph.operations().unwrap().is_empty(), "{pointer}");
    }
}

#[tokio::test]
async fn test_author_with_several_orcids_links_each() {
    let (graph, service) = setup(MemoryGraph::from_snapshot(snapshot()));
    let mut payload = paper_payload();
    payload["authors"] = json!([{
        "name": "New Author",
        "identifiers": { "orcid": ["0000-1111-2222-3333", "0000-4444-5555-6666"] }
    }]);
    let command: CreatePaperCommand = serde_json::from_value(payload).unwrap();

    let paper_id = service.create(&command).await.unwrap();

    let snapshot = graph.snapshot().unwrap();
    let list = objects_of(&snapshot, &paper_id, predicates::HAS_AUTHORS)[0];
    let author = &snapshot.lists[list].elements[0];
    assert_eq!(objects_of(&snapshot, author, predicates::HAS_ORCID).len(), 2);
}

#[tokio::test]
async fn test_malformed_temp_id_fails_without_lookups() {
    let (graph, service) = setup(MemoryGraph::from_snapshot(snapshot()));
    let mut payload = paper_payload();
    payload["contents"]["literals"] = json!({ "#": { "label": "1" } });
    let command: CreatePaperCommand = serde_json::from_value(payload).unwrap();

    let err = service.create(&command).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidTempId { .. }));
    assert!(err.is_client_error());
    assert_eq!(graph.lookup_count(), 0);
}

#[tokio::test]
async fn test_contribution_is_added_to_existing_paper() {
    let (graph, service) = setup(MemoryGraph::from_snapshot(snapshot()));
    let paper_id = service.create(&paper_command()).await.unwrap();

    let command: CreateContributionCommand = serde_json::from_value(json!({
        "paper_id": paper_id,
        "resources": { "#dataset": { "label": "WMT 2014", "classes": ["C2000"] } },
        "predicates": { "#uses": { "label": "uses dataset" } },
        "contribution": {
            "label": "Contribution 2",
            "classes": ["C2000"],
            "statements": { "#uses": [{ "id": "#dataset" }] }
        }
    }))
    .unwrap();

    let created = service.create_contribution(&command).await.unwrap();

    assert_eq!(created.paper_id, paper_id);
    let snapshot = graph.snapshot().unwrap();
    assert_eq!(
        objects_of(&snapshot, &paper_id, predicates::HAS_CONTRIBUTION).len(),
        2
    );
    let contribution = &snapshot.resources[&created.contribution_id];
    assert!(contribution.has_class(&ThingId::new("C2000")));

    let dataset = snapshot
        .statements
        .iter()
        .find(|s| s.subject == created.contribution_id)
        .map(|s| s.object.clone())
        .unwrap();
    let dataset = graph.find_by_thing_id(&dataset).await.unwrap();
    assert!(matches!(dataset, Some(Thing::Resource(r)) if r.label == "WMT 2014"));
}

#[tokio::test]
async fn test_contribution_to_unknown_paper_is_rejected() {
    let (graph, service) = setup(MemoryGraph::from_snapshot(snapshot()));
    let command: CreateContributionCommand = serde_json::from_value(json!({
        "paper_id": "R404",
        "contribution": {
            "label": "Orphan",
            "statements": { "P32": [{ "id": "R3003" }] }
        }
    }))
    .unwrap();

    let err = service.create_contribution(&command).await.unwrap_err();

    assert!(matches!(err, AppError::PaperNotFound(id) if id.as_str() == "R404"));
    assert!(graph.operations().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_materialization_keeps_created_entities() {
    let (graph, service) = setup(MemoryGraph::from_snapshot(snapshot()).fail_after_writes(3));

    let err = service.create(&paper_command()).await.unwrap_err();

    assert!(matches!(err, AppError::Storage(_)));
    assert!(!err.is_client_error());
    let snapshot = graph.snapshot().unwrap();
    let papers: Vec<_> = snapshot
        .resources
        .values()
        .filter(|r| r.has_class(&ThingId::new(classes::PAPER)))
        .collect();
    assert_eq!(papers.len(), 1);
    assert_eq!(graph.operations().unwrap().len(), 3);
}
