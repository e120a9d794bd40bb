//! Core Module - Scoring Logic
//!
//! The pure calculator and the per-entity i-Score engine built on it.

pub mod engine;
pub mod score;

pub use engine::*;
pub use score::*;
