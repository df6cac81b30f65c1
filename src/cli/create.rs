//! Paper and contribution command handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::Config;
use crate::context::Context;
use crate::di::FromRef;
use crate::models::{CreateContributionCommand, CreatePaperCommand};
use crate::repositories::{AppStore, GraphSnapshot, MemoryGraph};
use crate::services::PaperService;

use super::App;

impl App {
    /// Run the paper command: create a paper and print its id.
    pub async fn run_paper(&self, input: &Path) -> Result<()> {
        let command: CreatePaperCommand = read_payload(input)?;
        let (graph, service, snapshot_path) = self.open()?;

        let result = service.create(&command).await;
        self.finish(&graph, snapshot_path.as_deref())?;

        let paper_id = result?;
        println!("{}", serde_json::to_string_pretty(&json!({ "paper_id": paper_id }))?);
        Ok(())
    }

    /// Run the contribution command: add a contribution and print both ids.
    pub async fn run_contribution(&self, input: &Path) -> Result<()> {
        let command: CreateContributionCommand = read_payload(input)?;
        let (graph, service, snapshot_path) = self.open()?;

        let result = service.create_contribution(&command).await;
        self.finish(&graph, snapshot_path.as_deref())?;

        println!("{}", serde_json::to_string_pretty(&result?)?);
        Ok(())
    }

    fn open(&self) -> Result<(Arc<MemoryGraph>, PaperService, Option<PathBuf>)> {
        let config = Config::load()?;
        let snapshot_path = self.graph.clone().or_else(|| config.storage.snapshot.clone());

        let graph = match &snapshot_path {
            Some(path) if path.exists() => {
                let snapshot: GraphSnapshot = read_payload(path)?;
                tracing::info!(path = %path.display(), "Loaded graph snapshot");
                MemoryGraph::from_snapshot(snapshot)
            }
            _ => {
                tracing::info!("Starting from a seeded empty graph");
                MemoryGraph::seeded()
            }
        };

        let graph = Arc::new(graph);
        let store: AppStore = graph.clone();
        let ctx = Context::with_store(store, config);
        Ok((graph, PaperService::from_ref(&ctx), snapshot_path))
    }

    /// Writes the snapshot back when `--save` is set, including after a
    /// failed run.
    fn finish(&self, graph: &MemoryGraph, snapshot_path: Option<&Path>) -> Result<()> {
        if !self.save {
            return Ok(());
        }
        let path = snapshot_path.ok_or_else(|| eyre!("--save needs a --graph snapshot path"))?;
        let snapshot = graph.snapshot()?;
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Saved graph snapshot");
        Ok(())
    }
}

fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("Could not parse {}", path.display()))
}
