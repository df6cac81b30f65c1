//! Storage ports and the in-memory adapter.
//!
//! Pipeline stages depend only on the narrow traits in [`traits`]; the
//! shared [`AppStore`] handle is resolved from the [`Context`](crate::context::Context).

mod memory;
mod traits;

use std::sync::Arc;

pub use memory::{GraphSnapshot, MemoryGraph, WriteOperation};
pub use traits::{
    normalize, CommunityRepository, CreateList, CreateLiteral, CreateResource, GraphStore,
    ResourceRepository, SearchString, StatementRepository, StatementWriter, ThingRepository,
    ThingWriter,
};

/// Shared store handle.
pub type AppStore = Arc<dyn GraphStore>;
