//! Data Module - Store & Synthetic Generation

pub mod generator;
pub mod store;

pub use generator::*;
pub use store::*;
