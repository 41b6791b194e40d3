// src/config/mod.rs

//! File-based group settings.
//!
//! A TOML document with a single `[group]` table maps onto [`crate::Options`]
//! through [`GroupSettings::into_options`].

pub mod loader;
pub mod model;
mod validate;

pub use loader::{from_toml_str, load_from_path};
pub use model::{GroupSection, GroupSettings, RawGroupSettings};
