// ATS analysis: reduce → compile → generate → bounded persistence.
// All backend calls go through llm_client; nothing here talks HTTP directly.

pub mod compiler;
pub mod gate;
pub mod handlers;
pub mod keywords;
pub mod markup;
pub mod pipeline;
pub mod prompts;
pub mod reducer;
pub mod store;
