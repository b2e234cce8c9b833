//! Store - keyed persistence for annotation collections
//!
//! The engine only requires a durable key-value mapping from a document
//! identity to a serialized annotation collection. This crate provides the
//! `KeyValueStore` seam, file-backed and in-memory implementations, the
//! persisted record format, and an adapter that writes through a primary
//! store with a silent fallback.

mod record;
mod kv;
mod adapter;
mod error;

pub use record::*;
pub use kv::*;
pub use adapter::*;
pub use error::*;
