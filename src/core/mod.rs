pub mod content;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod summarizer;
pub mod transcriber;
