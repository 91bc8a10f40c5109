//! Core processing modules
//!
//! AI backends and the text normalization applied before command matching.

pub mod ai;
pub mod gemini;
pub mod ollama;
pub mod text_normalizer;

pub use ai::{create_adapter, AiAdapter, AiFallback};
pub use text_normalizer::TextNormalizer;
