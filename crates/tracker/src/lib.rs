//! Tracker - the per-document session over the annotation engine
//!
//! One `TrackerSession` is constructed per open document identity and owns
//! the annotation collection, persistence adapter, and reconciliation
//! scheduling for that document. Events arrive as a bounded set of kinds;
//! reconciliation after content mutations is debounced by replacing the
//! pending pass, never by queuing a second one.

mod identity;
mod session;
mod worker;

pub use identity::*;
pub use session::*;
pub use worker::*;
