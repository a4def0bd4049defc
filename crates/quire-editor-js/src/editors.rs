//! QuireEditors - the page-level entry point for JavaScript.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Element;

use quire_editor_browser::{
    BrowserHost, Catalog, DomEditors, EditorConfig, EditorContext, StyleSet, plugins,
};

use crate::types::JsEditorConfig;

/// All editors of a page, their toolbars and plugins.
///
/// Locale, translations and styles may be configured before `init`; styles
/// become toolbar items when `init` runs.
#[wasm_bindgen]
pub struct QuireEditors {
    catalog: Rc<RefCell<Catalog>>,
    styles: Vec<StyleSet>,
    dom: Option<DomEditors>,
}

impl QuireEditors {
    fn dom(&self) -> Result<&DomEditors, JsError> {
        self.dom
            .as_ref()
            .ok_or_else(|| JsError::new("QuireEditors.init() has not been called"))
    }

    fn with<R>(&self, f: impl FnOnce(&mut EditorContext<BrowserHost>) -> R) -> Result<R, JsError> {
        self.dom()?
            .with(f)
            .ok_or_else(|| JsError::new("editors are busy handling an event"))
    }
}

impl Default for QuireEditors {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl QuireEditors {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            catalog: Rc::new(RefCell::new(Catalog::new())),
            styles: Vec::new(),
            dom: None,
        }
    }

    /// Create the context, register the built-in plugins and start listening
    /// on the document. Calling it again is a no-op.
    pub fn init(&mut self) -> Result<(), JsError> {
        if self.dom.is_some() {
            tracing::warn!(target: "quire::js", "init called twice");
            return Ok(());
        }
        let host = BrowserHost::from_window().ok_or_else(|| JsError::new("no window or document"))?;
        let mut ctx = EditorContext::new(host).with_translator(Rc::clone(&self.catalog));
        ctx.plugins(plugins::defaults());
        if !self.styles.is_empty() {
            ctx.plugin(plugins::styles(self.styles.clone()));
        }
        ctx.init();
        self.dom = Some(DomEditors::attach(ctx));
        tracing::debug!(target: "quire::js", "initialised");
        Ok(())
    }

    /// Turn every `[data-editor]` element into an editor.
    pub fn register(&self) -> Result<(), JsError> {
        self.with(|ctx| ctx.register())
    }

    /// Create an editor on `el`, returning its id.
    pub fn create(&self, el: Element, config: Option<JsEditorConfig>) -> Result<String, JsError> {
        let config: EditorConfig = config.unwrap_or_default().into();
        self.with(|ctx| ctx.create_editor(el, config))?
            .map(|id| id.to_string())
            .map_err(|e| JsError::new(&format!("Failed to create editor: {}", e)))
    }

    /// Current content of an editor.
    pub fn code(&self, id: &str) -> Result<Option<String>, JsError> {
        self.with(|ctx| ctx.code(id))
    }

    /// Tear down an editor and its toolbar. Returns whether it existed.
    pub fn destroy(&self, id: &str) -> Result<bool, JsError> {
        self.with(|ctx| ctx.destroy_editor(id))
    }

    pub fn locale(&self, locale: &str) {
        self.catalog.borrow_mut().set_locale(locale);
    }

    /// Fallback chain as an object of locale to fallback locale.
    #[wasm_bindgen(js_name = localeFallbacks)]
    pub fn locale_fallbacks(&self, fallbacks: JsValue) -> Result<(), JsError> {
        let fallbacks: HashMap<String, String> = serde_wasm_bindgen::from_value(fallbacks)
            .map_err(|e| JsError::new(&format!("Invalid fallbacks: {}", e)))?;
        self.catalog.borrow_mut().set_fallbacks(fallbacks);
        Ok(())
    }

    /// Merge `messages` (message to translation) into `locale`.
    #[wasm_bindgen(js_name = addTranslations)]
    pub fn add_translations(&self, locale: &str, messages: JsValue) -> Result<(), JsError> {
        let messages: HashMap<String, String> = serde_wasm_bindgen::from_value(messages)
            .map_err(|e| JsError::new(&format!("Invalid translations: {}", e)))?;
        self.catalog.borrow_mut().add(locale, messages);
        Ok(())
    }

    /// Add a style set: `{ key, title, options: { label: class }, optionToClass }`.
    #[wasm_bindgen(js_name = addStyle)]
    pub fn add_style(&mut self, style: JsValue) -> Result<(), JsError> {
        if self.dom.is_some() {
            return Err(JsError::new("styles must be added before init()"));
        }
        let style: StyleSet = serde_wasm_bindgen::from_value(style)
            .map_err(|e| JsError::new(&format!("Invalid style: {}", e)))?;
        self.styles.push(style);
        Ok(())
    }
}
