//! # paddock-common
//!
//! Shared types, error definitions, configuration model, and constants
//! used across the Paddock workspace. Leaf crate: everything else
//! depends on it, it depends on nothing internal.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
