//! Authorship annotations - the reconciliation engine core
//!
//! Annotations record which spans of a document were AI-assisted and which
//! were human-written. They carry no offsets or node references; the stored
//! normalized snippet is the only key used to relocate a span, so the engine
//! must find snippets inside a live tree whose nodes split, merge, and
//! disappear between sessions, and must drop annotations whose text no
//! longer exists anywhere in the document.

mod normalize;
mod annotation;
mod store;
mod index;
mod reconcile;
mod stats;

pub use normalize::*;
pub use annotation::*;
pub use store::*;
pub use index::*;
pub use reconcile::*;
pub use stats::*;
