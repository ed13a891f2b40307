// ============================================================================
// File: src/lib.rs
// Library root: decide-then-answer agent over Gemini and Google Custom Search
// ============================================================================

pub mod config;
pub mod decision;
pub mod llm_client;
pub mod models;
pub mod orchestrator;
pub mod search_client;
pub mod synthesis;
