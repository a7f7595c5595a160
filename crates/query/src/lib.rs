//! Query pipeline for a remote knowledge base.
//!
//! Every question takes one linear pass:
//! normalizer → provider call → shaper, with the timing instrumentor
//! wrapped around all three. Retrieval planning, search and answer
//! synthesis all happen inside the remote provider.

pub mod normalize;
pub mod service;
pub mod session;
pub mod shape;
pub mod timing;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use normalize::{build_request, normalize_question, QueryInput, RequestOverrides};
pub use service::{QueryFailure, QueryService};
pub use session::Session;
pub use shape::{extract_answers, renumber_citation_markers, shape_citations};
pub use timing::{Phase, Timing, TimingRecorder};
pub use types::{
    AppliedOverrides, Citation, CitationType, Interaction, InteractionMetadata,
    KNOWLEDGE_BASE_DEFAULT,
};
