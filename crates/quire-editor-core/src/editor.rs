//! Editor instances and the editor registry.

use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::config::{EditorConfig, Settings};
use crate::context::EditorContext;
use crate::error::HostError;
use crate::event::{EditorEvent, EventBus, EventKind, Listener};
use crate::host::{EditingHost, ElementSpec};
use crate::i18n::Translator;
use crate::selection::{EDITOR_ID_ATTRIBUTE, SelectionManager};
use crate::types::{EditorId, ToolbarId};

/// Attributes an editor surface carries while it is mounted.
pub(crate) const SURFACE_ATTRIBUTES: &[&str] = &[
    EDITOR_ID_ATTRIBUTE,
    "data-editor-type",
    "data-placeholder",
    "spellcheck",
    "role",
    "aria-multiline",
    "aria-label",
];

/// What [`EditorContext::create_editor`] needs: the configuration plus
/// listeners for the new editor's own bus.
///
/// The listeners are subscribed before `created` fires. Registration from
/// markup never carries any.
pub struct EditorOptions<H: EditingHost> {
    pub config: EditorConfig,
    pub(crate) events: Vec<(EventKind, Listener<H>)>,
}

impl<H: EditingHost> EditorOptions<H> {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
        }
    }

    /// Listen on the editor's own bus. Local kinds are the interaction
    /// kinds plus `created` and `destroyed`.
    pub fn on(
        mut self,
        kind: EventKind,
        listener: impl Fn(&mut EditorContext<H>, &mut EditorEvent<H>) + 'static,
    ) -> Self {
        self.events.push((kind, Rc::new(listener)));
        self
    }
}

impl<H: EditingHost> From<EditorConfig> for EditorOptions<H> {
    fn from(config: EditorConfig) -> Self {
        Self::new(config)
    }
}

impl<H: EditingHost> fmt::Debug for EditorOptions<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorOptions")
            .field("config", &self.config)
            .field("events", &self.events.iter().map(|(k, _)| *k).collect::<Vec<_>>())
            .finish()
    }
}

/// One editable surface.
pub struct Editor<H: EditingHost> {
    id: EditorId,
    root: H::Node,
    shadow: Option<H::Node>,
    config: EditorConfig,
    selection: SelectionManager<H>,
    pub(crate) source_mode: bool,
    bus: EventBus<H>,
}

impl<H: EditingHost> fmt::Debug for Editor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("shadow", &self.shadow)
            .field("config", &self.config)
            .field("source_mode", &self.source_mode)
            .finish_non_exhaustive()
    }
}

impl<H: EditingHost> Editor<H> {
    /// Turn `el` into an editable surface.
    ///
    /// A `<textarea>` is replaced by a `div.editor-textarea` holding its value
    /// and a hidden input with the same name that mirrors the content.
    pub(crate) fn mount(
        host: &H,
        id: EditorId,
        el: H::Node,
        config: EditorConfig,
        settings: &Settings,
        translator: &dyn Translator,
    ) -> Result<Self, HostError> {
        let mut root = el;
        let mut shadow = None;

        if host.tag_name(&root) == "textarea" {
            let value = host.value(&root).unwrap_or_default();
            let surface = host.create_element(&ElementSpec::new("div").with_class("editor-textarea"))?;
            host.set_inner_html(&surface, &value);

            let mut input = ElementSpec::new("input");
            input.input_type = Some("hidden".to_string());
            input.name = host.attribute(&root, "name");
            let input = host.create_element(&input)?;
            host.set_value(&input, &value);

            host.insert_after(&root, &input)?;
            host.replace_node(&root, &surface)?;
            root = surface;
            shadow = Some(input);
        }

        let placeholder = translator.translate(
            config
                .placeholder
                .as_deref()
                .unwrap_or(settings.placeholder.as_str()),
        );
        host.set_attribute(&root, EDITOR_ID_ATTRIBUTE, id.as_str());
        host.set_attribute(&root, "data-editor-type", "editor");
        host.set_attribute(&root, "data-placeholder", &placeholder);
        host.set_attribute(&root, "spellcheck", "false");
        host.set_attribute(&root, "role", "textbox");
        host.set_attribute(&root, "aria-multiline", "true");
        host.set_attribute(&root, "aria-label", &placeholder);
        host.set_content_editable(&root, true);

        Ok(Self {
            selection: SelectionManager::new(root.clone(), settings.marker_attribute.clone()),
            id,
            root,
            shadow,
            config,
            source_mode: false,
            bus: EventBus::new(),
        })
    }

    /// Undo [`Editor::mount`]'s attributes on the surface.
    pub(crate) fn unmount(&self, host: &H) {
        for attribute in SURFACE_ATTRIBUTES {
            host.remove_attribute(&self.root, attribute);
        }
        host.set_content_editable(&self.root, false);
    }

    pub fn id(&self) -> &EditorId {
        &self.id
    }

    pub fn toolbar_id(&self) -> ToolbarId {
        ToolbarId::from(&self.id)
    }

    pub fn root(&self) -> &H::Node {
        &self.root
    }

    /// Hidden form field replacing a textarea.
    pub fn shadow(&self) -> Option<&H::Node> {
        self.shadow.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionManager<H> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionManager<H> {
        &mut self.selection
    }

    pub fn is_source_mode(&self) -> bool {
        self.source_mode
    }

    /// Listeners private to this editor.
    pub fn bus(&self) -> &EventBus<H> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus<H> {
        &mut self.bus
    }

    /// Element an empty surface is wrapped in when typing starts.
    pub fn wrap_tag(&self, settings: &Settings) -> SmolStr {
        self.config
            .wrap_after_empty
            .clone()
            .unwrap_or_else(|| settings.default_wrap.clone())
    }

    /// Raw text in source mode, serialized markup otherwise.
    pub fn code(&self, host: &H) -> String {
        if self.source_mode {
            host.text_content(&self.root)
        } else {
            host.inner_html(&self.root)
        }
    }

    /// Copy the content into the shadow field.
    pub fn sync_shadow(&self, host: &H) {
        if let Some(shadow) = &self.shadow {
            host.set_value(shadow, &self.code(host));
        }
    }
}

/// Editors in creation order with the active pointer.
pub struct EditorRegistry<H: EditingHost> {
    editors: Vec<Editor<H>>,
    active: Option<EditorId>,
}

impl<H: EditingHost> Default for EditorRegistry<H> {
    fn default() -> Self {
        Self {
            editors: Vec::new(),
            active: None,
        }
    }
}

impl<H: EditingHost> EditorRegistry<H> {
    pub fn get(&self, id: &str) -> Option<&Editor<H>> {
        self.editors.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Editor<H>> {
        self.editors.iter_mut().find(|e| e.id() == id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn all(&self) -> &[Editor<H>] {
        &self.editors
    }

    pub fn ids(&self) -> Vec<EditorId> {
        self.editors.iter().map(|e| e.id().clone()).collect()
    }

    /// Editor whose surface is `node`.
    pub fn by_root(&self, node: &H::Node) -> Option<&Editor<H>> {
        self.editors.iter().find(|e| e.root() == node)
    }

    pub(crate) fn insert(&mut self, editor: Editor<H>) {
        self.editors.push(editor);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Editor<H>> {
        let index = self.editors.iter().position(|e| e.id() == id)?;
        if self.active.as_ref().is_some_and(|a| a == id) {
            self.active = None;
        }
        Some(self.editors.remove(index))
    }

    pub fn active_id(&self) -> Option<&EditorId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&Editor<H>> {
        self.active.as_ref().and_then(|id| self.get(id.as_str()))
    }

    /// Make `id` the active editor. Unknown ids are ignored.
    pub fn set_active(&mut self, id: &str) {
        if let Some(editor) = self.get(id) {
            self.active = Some(editor.id().clone());
        }
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }
}
