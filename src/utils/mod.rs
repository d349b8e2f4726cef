//! Utils Module - Shared Constants
//!
//! Single source of truth for values used across the engine.

pub mod constants;

pub use constants::*;
