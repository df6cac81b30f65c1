//! Business logic services for paper creation.
//!
//! Services orchestrate repositories through staged pipelines,
//! using the `FromContext` derive macro for dependency injection.

pub mod actions;
pub mod pipeline;

mod paper;

pub use paper::PaperService;
pub use pipeline::{Action, Pipeline, PipelineStage, PipelineState, ValidatedId};
