pub mod analysis;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod resumes;
pub mod routes;
pub mod state;
