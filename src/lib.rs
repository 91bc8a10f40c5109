//! JARVIS Library
//!
//! Core modules for the JARVIS text and voice assistant.

pub mod asr;
pub mod audit;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod launcher;
pub mod lookup;
pub mod memory;
pub mod monitor;
pub mod responses;
pub mod router;
pub mod session;
pub mod speechd;
pub mod transcript;
pub mod tts;
pub mod utils;
