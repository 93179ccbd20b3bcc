//! promptspec - Turn rough task prompts into structured, scored specifications
//!
//! Classifies a natural-language request into a workflow category, resolves
//! references to helper agents, gathers project context from the filesystem,
//! asks a language model for a structured rewrite (or synthesizes one offline
//! when no model answers), and scores the result against a fixed rule set.
//! Supports Anthropic, OpenAI and OpenAI-compatible (Ollama) providers.

pub mod agents;
pub mod cache;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod context;
pub mod detector;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod render;
pub mod types;
pub mod util;
pub mod validator;

pub use error::{EnhanceError, Ignored};
pub use pipeline::Enhancer;
pub use types::{RawInput, StructuredResult, WorkflowCategory};
