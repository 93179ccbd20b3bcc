//! The enhancement pipeline: orchestration, fallback synthesis and the
//! per-category tables the fallback draws from.

pub mod enhancer;
pub mod fallback;
pub mod tables;

pub use enhancer::{Enhancer, Stage};
pub use fallback::FallbackSynthesizer;
