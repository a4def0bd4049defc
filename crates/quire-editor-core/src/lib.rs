//! quire-editor-core: floating-toolbar rich text editing without a DOM.
//!
//! This crate provides:
//! - `EditingHost` trait abstracting the page the editor runs in
//! - `MemoryHost` - in-memory element tree implementing it, used by tests
//! - `EditorContext<H>` - editors, toolbars, the event bus and plugins
//! - Built-in feature plugins under [`plugins`]
//! - `Catalog` - locale-aware message lookup for titles and labels
//!
//! Everything is generic over the host, so the browser bindings only need
//! to implement `EditingHost` over `web-sys` and route DOM events in.

pub mod config;
pub mod context;
pub mod debounce;
pub mod editor;
pub mod error;
pub mod event;
pub mod host;
pub(crate) mod html;
pub mod i18n;
pub mod interaction;
pub mod memory;
pub mod plugin;
pub mod plugins;
pub mod selection;
pub mod toolbar;
pub mod types;

pub use config::{EditorConfig, Settings};
pub use context::{EditorContext, KeyupSchedule};
pub use editor::{Editor, EditorOptions, EditorRegistry};
pub use error::{ConfigError, HostError};
pub use event::{BuildRequest, EditorEvent, EventBus, EventKind, ListenerId};
pub use host::{EditingHost, ElementSpec, HostSelection, Point, Rect, Size};
pub use html::escape_html;
pub use i18n::{Catalog, Translator};
pub use interaction::{Interaction, InteractionKind, InteractionOutcome, Key};
pub use memory::{MemoryHost, NodeRef};
pub use plugin::Plugin;
pub use plugins::StyleSet;
pub use selection::SelectionSnapshot;
pub use smol_str::SmolStr;
pub use toolbar::{
    Command, ItemParams, ItemTrigger, MatchField, Placement, PositionRequest, Toolbar,
    ToolbarItem, Undo,
};
pub use types::{EditorId, ToolbarId};
