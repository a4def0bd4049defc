//! Browser DOM layer for the quire editor.
//!
//! Implements `EditingHost` over `web-sys` and routes document events into
//! an `EditorContext`. It assumes a `wasm32-unknown-unknown` target
//! environment.
//!
//! # Architecture
//!
//! - `host`: `BrowserHost`, the live-DOM editing host
//! - `events`: native event to `Interaction` conversion
//! - `delegate`: document listeners, re-entrancy guard, keyup timers
//!
//! # Re-exports
//!
//! This crate re-exports `quire-editor-core` for convenience, so consumers
//! only need to depend on `quire-editor-browser`.

// Re-export core crate
pub use quire_editor_core;
pub use quire_editor_core::*;

pub mod delegate;
pub mod events;
pub mod host;

pub use delegate::{DomEditors, SharedContext};
pub use host::BrowserHost;
