// src/config/mod.rs

//! Command whitelist loading and validation.
//!
//! Responsibilities:
//! - Define the whitelist data model (`model.rs`).
//! - Load a whitelist file from disk (`loader.rs`).
//! - Validate basic invariants like non-empty commands (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_from_path, load_whitelist, parse_lines};
pub use model::{RawConfigFile, Whitelist};
