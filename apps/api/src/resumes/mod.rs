// Thin resume reads and duplication. Form editing lives in the frontend.

pub mod duplicate;
pub mod handlers;
pub mod loader;
