// Requirement expression-quality evaluation.
// Implements: rule catalog, prompt construction, the two-call pipeline, exports.
// All LLM calls go through llm_client; no direct HTTP calls here.

pub mod export;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod rules;

pub use pipeline::Evaluator;
