//! Configuration module for scenesmith
//!
//! Provides types and loading for the optional `scn.toml` project file.

pub mod loader;
pub mod schema;

pub use schema::*;
