//! Per-editor configuration and global settings.
//!
//! Editors registered from markup read their configuration from the
//! `data-editor` attribute as JSON. Page authors write these by hand, so the
//! parser accepts the loose forms seen in the wild (`"newline": "false"`,
//! numeric ids) and registration falls back to defaults on invalid input.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use smol_str::SmolStr;

use crate::context::EditorContext;
use crate::editor::EditorOptions;
use crate::error::ConfigError;
use crate::event::{EditorEvent, EventKind};
use crate::host::EditingHost;

/// Configuration of one editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Explicit editor id.
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<SmolStr>,
    /// Toolbar item keys; `None` builds the default item set.
    pub toolbar: Option<Vec<SmolStr>>,
    /// Whether a bare Enter may insert a line break.
    #[serde(deserialize_with = "lenient_bool")]
    pub newline: bool,
    /// Element an empty surface is wrapped in when typing starts.
    #[serde(alias = "wrapAfterEmpty")]
    pub wrap_after_empty: Option<SmolStr>,
    pub placeholder: Option<String>,
    /// Set when the editor was created from a `data-editor` attribute.
    #[serde(skip_deserializing)]
    pub registered: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            id: None,
            toolbar: None,
            newline: true,
            wrap_after_empty: None,
            placeholder: None,
            registered: false,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration object.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a `data-editor` attribute value. Invalid JSON yields the empty
    /// configuration.
    pub fn from_attribute(json: &str) -> Self {
        match Self::parse(json) {
            Ok(mut config) => {
                config.registered = true;
                config
            }
            Err(e) => {
                tracing::debug!(target: "quire::config", error = %e, "ignoring invalid data-editor config");
                Self::default()
            }
        }
    }

    pub fn with_id(mut self, id: impl Into<SmolStr>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_toolbar<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.toolbar = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_newline(mut self, newline: bool) -> Self {
        self.newline = newline;
        self
    }

    /// Attach a listener for the editor's own bus.
    pub fn on<H: EditingHost>(
        self,
        kind: EventKind,
        listener: impl Fn(&mut EditorContext<H>, &mut EditorEvent<H>) + 'static,
    ) -> EditorOptions<H> {
        EditorOptions::new(self).on(kind, listener)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseBool {
    Bool(bool),
    Number(i64),
    Text(String),
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match LooseBool::deserialize(deserializer)? {
        LooseBool::Bool(b) => b,
        LooseBool::Number(n) => n != 0,
        LooseBool::Text(s) => !matches!(s.trim(), "false" | "0" | ""),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseId {
    Text(SmolStr),
    Number(i64),
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SmolStr>, D::Error> {
    Ok(
        match Option::<LooseId>::deserialize(deserializer)? {
            Some(LooseId::Text(s)) => Some(s),
            Some(LooseId::Number(n)) => Some(SmolStr::new(n.to_string())),
            None => None,
        },
    )
}

/// Global constants the toolbar engine and controllers use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum distance between a toolbar and the viewport edges.
    pub edge_margin: f64,
    /// Gap between a selection and the toolbar below it.
    pub selection_gap: f64,
    /// Vertical offset when no selection geometry is available.
    pub fallback_offset: f64,
    pub keyup_debounce_ms: u64,
    pub marker_attribute: SmolStr,
    pub default_wrap: SmolStr,
    pub placeholder: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            edge_margin: 10.0,
            selection_gap: 5.0,
            fallback_offset: 20.0,
            keyup_debounce_ms: 200,
            marker_attribute: SmolStr::new_static("data-marker"),
            default_wrap: SmolStr::new_static("p"),
            placeholder: "Start typing something...".to_string(),
        }
    }
}

impl Settings {
    pub fn keyup_debounce(&self) -> Duration {
        Duration::from_millis(self.keyup_debounce_ms)
    }
}
