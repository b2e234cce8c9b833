//! Document Model - Tree-structured editing surface
//!
//! This crate provides the document tree the annotation engine operates on:
//! a root document holding region containers, which hold paragraphs, which
//! hold text runs (the text-bearing leaves). Node identities are stable
//! UUIDs that survive serialization.

mod node;
mod document;
mod container;
mod paragraph;
mod run;
mod tree;
mod error;

pub use node::*;
pub use document::*;
pub use container::*;
pub use paragraph::*;
pub use run::*;
pub use tree::*;
pub use error::*;
