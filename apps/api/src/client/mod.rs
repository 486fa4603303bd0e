//! Client-side pieces: the HTTP client, credential recovery, editor session
//! state and debounced autosave.

pub mod api;
pub mod autosave;
pub mod recovery;
pub mod session;
