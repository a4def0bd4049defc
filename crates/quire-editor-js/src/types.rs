//! Types exposed to JavaScript via wasm-bindgen.

use quire_editor_browser::{EditorConfig, SmolStr};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// Editor options accepted by `QuireEditors.create`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", default)]
pub struct JsEditorConfig {
    #[tsify(optional)]
    pub id: Option<String>,
    /// Toolbar item keys; omitted builds the default set.
    #[tsify(optional)]
    pub toolbar: Option<Vec<String>>,
    /// `false` stops a bare Enter from inserting a line break.
    #[tsify(optional)]
    pub newline: Option<bool>,
    #[tsify(optional)]
    pub wrap_after_empty: Option<String>,
    #[tsify(optional)]
    pub placeholder: Option<String>,
}

impl From<JsEditorConfig> for EditorConfig {
    fn from(js: JsEditorConfig) -> Self {
        let defaults = EditorConfig::default();
        EditorConfig {
            id: js.id.map(SmolStr::from),
            toolbar: js
                .toolbar
                .map(|keys| keys.into_iter().map(SmolStr::from).collect()),
            newline: js.newline.unwrap_or(defaults.newline),
            wrap_after_empty: js.wrap_after_empty.map(SmolStr::from),
            placeholder: js.placeholder,
            registered: false,
        }
    }
}
