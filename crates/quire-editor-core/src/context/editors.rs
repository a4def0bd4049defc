//! Editor lifecycle and the interaction controller.

use smol_str::SmolStr;

use super::EditorContext;
use crate::config::EditorConfig;
use crate::editor::{Editor, EditorOptions};
use crate::error::HostError;
use crate::event::EditorEvent;
use crate::host::{EditingHost, ElementSpec};
use crate::html::escape_html;
use crate::interaction::{Interaction, InteractionKind, InteractionOutcome, Key};
use crate::selection::SelectionSnapshot;
use crate::toolbar::{ItemParams, PositionRequest};
use crate::types::{EditorId, ToolbarId};

/// Attribute holding the JSON config of surfaces picked up by
/// [`EditorContext::register`].
pub const REGISTER_ATTRIBUTE: &str = "data-editor";

/// Attribute marking elements that belong to the widget (surfaces and
/// toolbars). Clicks outside them close the toolbars.
pub const WIDGET_ATTRIBUTE: &str = "data-editor-type";

const ZERO_WIDTH_SPACE: &str = "\u{200B}";

impl<H: EditingHost> EditorContext<H> {
    /// Fire `editors.init`. Plugins register their templates here.
    pub fn init(&mut self) {
        tracing::debug!(target: "quire::editor", "init");
        self.fire(EditorEvent::EditorsInit);
    }

    /// Create an editor for every `[data-editor]` element, then fire
    /// `editors.registered`.
    pub fn register(&mut self) {
        for el in self.host.find_with_attribute(None, REGISTER_ATTRIBUTE) {
            let json = self.host.attribute(&el, REGISTER_ATTRIBUTE).unwrap_or_default();
            let config = EditorConfig::from_attribute(&json);
            self.host.remove_attribute(&el, REGISTER_ATTRIBUTE);
            if let Err(e) = self.create_editor(el, config) {
                tracing::warn!(target: "quire::editor", error = %e, "failed to create registered editor");
            }
        }
        self.fire(EditorEvent::EditorsRegistered);
    }

    /// Turn `el` into an editor.
    ///
    /// The id comes from the config, then a textarea's `name`, then the id
    /// counter. Creating an id that already exists returns it unchanged.
    pub fn create_editor(
        &mut self,
        el: H::Node,
        options: impl Into<EditorOptions<H>>,
    ) -> Result<EditorId, HostError> {
        let EditorOptions { config, events } = options.into();
        let id = match &config.id {
            Some(id) => EditorId::new(id.clone()),
            None => match self.host.attribute(&el, "name") {
                Some(name) if !name.is_empty() && self.host.tag_name(&el) == "textarea" => {
                    EditorId::new(name)
                }
                _ => EditorId::new(self.next_id()),
            },
        };
        if self.editors.has(&id) {
            tracing::debug!(target: "quire::editor", editor = %id, "editor exists");
            return Ok(id);
        }

        let mut editor = Editor::mount(
            &self.host,
            id.clone(),
            el,
            config,
            &self.settings,
            self.translator.as_ref(),
        )?;
        if let Err(e) = self.create_toolbar(Some(ToolbarId::from(&id))) {
            editor.unmount(&self.host);
            return Err(e);
        }
        let keys = editor.config().toolbar.clone();
        for (kind, listener) in events {
            editor.bus_mut().listen_rc(kind, listener);
        }
        self.editors.insert(editor);
        self.build_toolbar(&id, keys, ItemParams::for_editor(id.clone()));

        tracing::debug!(target: "quire::editor", editor = %id, "created editor");
        self.fire_editor(&id, EditorEvent::EditorCreated { editor: id.clone() });
        Ok(id)
    }

    /// Make `id` the active editor. Unknown ids are ignored.
    pub fn set_active_editor(&mut self, id: &str) {
        self.editors.set_active(id);
    }

    pub fn active_editor_id(&self) -> Option<EditorId> {
        self.editors.active_id().cloned()
    }

    pub fn clear_active_editor(&mut self) {
        self.editors.clear_active();
    }

    /// Tag names enclosing the active editor's selection.
    pub fn enclosing_tag_names(&self) -> Vec<SmolStr> {
        self.editors
            .active()
            .map(|e| e.selection().enclosing_tag_names(&self.host))
            .unwrap_or_default()
    }

    /// Live selection of an editor; empty for unknown editors.
    pub fn current_selection(&self, editor: &str) -> SelectionSnapshot<H::Node> {
        self.editors
            .get(editor)
            .map(|e| e.selection().current(&self.host))
            .unwrap_or_default()
    }

    pub fn saved_selection(&self, editor: &str) -> Option<SelectionSnapshot<H::Node>> {
        self.editors.get(editor).map(|e| e.selection().saved().clone())
    }

    pub fn save_selection(&mut self, editor: &str, marker: bool) {
        self.with_editor(editor, |e, host| e.selection_mut().save(host, marker));
    }

    /// Remove an editor's selection marker.
    pub fn clear_selection(&mut self, editor: &str) {
        self.with_editor(editor, |e, host| e.selection_mut().clear(host));
    }

    /// React to an interaction on an editor surface, then fire
    /// `editor.<kind>` globally and on the editor's own bus.
    pub fn handle_interaction(
        &mut self,
        editor: &str,
        interaction: Interaction<H::Node>,
    ) -> InteractionOutcome {
        if !self.editors.has(editor) {
            return InteractionOutcome::PASS;
        }
        tracing::trace!(target: "quire::editor", editor, kind = %interaction.kind, "interaction");

        let mut outcome = InteractionOutcome::PASS;
        match interaction.kind {
            InteractionKind::MouseDown => {
                self.set_active_editor(editor);
                self.close_toolbars(&[], false);
            }
            InteractionKind::MouseUp => {
                if self.current_selection(editor).has_text() {
                    self.open_toolbar(editor, true, true);
                    self.position_toolbar(editor, PositionRequest::at_pointer(interaction.page));
                }
            }
            InteractionKind::Click => self.set_active_editor(editor),
            InteractionKind::KeyDown => {
                self.wrap_empty_surface(editor, interaction.key.as_ref());
                self.close_toolbars(&[], false);
            }
            InteractionKind::KeyPress => {
                let newline = self.editors.get(editor).is_none_or(|e| e.config().newline);
                if !newline && interaction.key == Some(Key::Enter) && !interaction.shift {
                    outcome = InteractionOutcome::PREVENT;
                }
            }
            InteractionKind::Blur => {
                if let Some(e) = self.editors.get(editor) {
                    e.sync_shadow(&self.host);
                }
            }
            InteractionKind::KeyUp | InteractionKind::Focus => {}
        }

        self.fire_editor(
            editor,
            EditorEvent::Interaction {
                editor: EditorId::new(editor),
                interaction,
            },
        );
        outcome
    }

    /// Start an empty surface with the wrap element so typed text lands in a
    /// block.
    fn wrap_empty_surface(&mut self, editor: &str, key: Option<&Key>) {
        if key.is_some_and(Key::is_deletion) {
            return;
        }
        let Some(e) = self.editors.get(editor) else {
            return;
        };
        let root = e.root().clone();
        if !self.host.inner_html(&root).trim().is_empty() {
            return;
        }

        let spec = ElementSpec::new(e.wrap_tag(&self.settings)).with_html(ZERO_WIDTH_SPACE);
        let wrapped = self
            .host
            .create_element(&spec)
            .and_then(|el| self.host.append_child(&root, &el).map(|()| el));
        match wrapped {
            Ok(el) => self.host.collapse_selection(&el, 0),
            Err(e) => {
                tracing::warn!(target: "quire::editor", editor, error = %e, "failed to wrap empty surface");
            }
        }
    }

    /// Handle a click anywhere on the page. Clicks outside every surface and
    /// toolbar close the toolbars and clear the active editor. Returns
    /// whether the click was outside.
    pub fn handle_outside_click(&mut self, target: Option<&H::Node>) -> bool {
        let inside = target.is_some_and(|t| self.host.closest_with_attribute(t, WIDGET_ATTRIBUTE).is_some());
        if inside {
            return false;
        }
        self.close_toolbars(&[], false);
        self.clear_active_editor();
        true
    }

    /// Content of an editor: raw text in source mode, markup otherwise.
    pub fn code(&self, editor: &str) -> Option<String> {
        self.editors.get(editor).map(|e| e.code(&self.host))
    }

    /// Show the markup as editable text. Every toolbar item except `keep`
    /// is disabled until [`leave_source_mode`](Self::leave_source_mode).
    pub fn enter_source_mode(&mut self, editor: &str, keep: &[&str]) -> bool {
        let Some(e) = self.editors.get_mut(editor) else {
            return false;
        };
        if e.source_mode {
            return false;
        }
        let root = e.root().clone();
        let markup = self.host.inner_html(&root);
        let spec = ElementSpec::new("pre")
            .with_class("editor-html-mode")
            .with_html(escape_html(&markup));
        let pre = match self.host.create_element(&spec) {
            Ok(pre) => pre,
            Err(err) => {
                tracing::warn!(target: "quire::editor", editor, error = %err, "failed to enter source mode");
                return false;
            }
        };

        self.host.set_inner_html(&root, "");
        self.host.set_content_editable(&root, false);
        self.host.set_content_editable(&pre, true);
        if let Err(err) = self.host.append_child(&root, &pre) {
            tracing::warn!(target: "quire::editor", editor, error = %err, "failed to attach source view");
            self.host.set_inner_html(&root, &markup);
            self.host.set_content_editable(&root, true);
            return false;
        }
        e.source_mode = true;
        tracing::debug!(target: "quire::editor", editor, "entered source mode");

        self.close_toolbar(editor, true);
        self.with_toolbar(editor, |tb, host| tb.disable_except(host, keep));
        true
    }

    /// Parse the edited text back into markup and re-enable the toolbar.
    pub fn leave_source_mode(&mut self, editor: &str) -> bool {
        let Some(e) = self.editors.get_mut(editor) else {
            return false;
        };
        if !e.source_mode {
            return false;
        }
        let root = e.root().clone();
        let text = self.host.text_content(&root);
        self.host.set_inner_html(&root, &text);
        self.host.set_content_editable(&root, true);
        e.source_mode = false;
        tracing::debug!(target: "quire::editor", editor, "left source mode");

        self.close_toolbar(editor, true);
        self.with_toolbar(editor, |tb, host| tb.enable_except(host, &[]));
        true
    }

    /// Tear an editor down: fire `editor.destroyed`, remove its toolbar and
    /// give the surface back to the page.
    pub fn destroy_editor(&mut self, editor: &str) -> bool {
        if !self.editors.has(editor) {
            return false;
        }
        self.fire_editor(
            editor,
            EditorEvent::EditorDestroyed {
                editor: EditorId::new(editor),
            },
        );
        self.leave_source_mode(editor);
        self.destroy_toolbar(editor);

        let Some(e) = self.editors.remove(editor) else {
            return false;
        };
        e.sync_shadow(&self.host);
        e.unmount(&self.host);
        tracing::debug!(target: "quire::editor", editor, "destroyed editor");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::event::EventKind;
    use crate::host::Point;
    use crate::memory::MemoryHost;
    use crate::toolbar::{Command, OPEN_CLASS, ToolbarItem};

    fn context() -> EditorContext<MemoryHost> {
        EditorContext::new(MemoryHost::new())
    }

    #[test]
    fn test_surface_attributes() {
        let mut ctx = context();
        let root = ctx.host().mount("<p>hi</p>");
        let id = ctx.create_editor(root.clone(), EditorConfig::default().with_id("main")).unwrap();
        assert_eq!(id, "main");

        let host = ctx.host();
        assert_eq!(host.attribute(&root, "data-editor-id").as_deref(), Some("main"));
        assert_eq!(host.attribute(&root, "data-editor-type").as_deref(), Some("editor"));
        assert_eq!(
            host.attribute(&root, "data-placeholder").as_deref(),
            Some("Start typing something...")
        );
        assert_eq!(host.attribute(&root, "role").as_deref(), Some("textbox"));
        assert!(host.is_content_editable(&root));
        assert!(ctx.toolbars().has("main"));
    }

    #[test]
    fn test_textarea_is_replaced() {
        let mut ctx = context();
        let wrapper = ctx.host().mount(r#"<textarea name="body">&lt;p&gt;x&lt;/p&gt;</textarea>"#);
        let textarea = ctx.host().first_with_tag(&wrapper, "textarea").unwrap();

        let id = ctx.create_editor(textarea, EditorConfig::default()).unwrap();
        assert_eq!(id, "body");

        let editor = ctx.editor("body").unwrap();
        let root = editor.root().clone();
        let shadow = editor.shadow().cloned().unwrap();
        assert!(ctx.host().has_class(&root, "editor-textarea"));
        assert_eq!(ctx.host().inner_html(&root), "<p>x</p>");
        assert_eq!(ctx.host().value(&shadow).as_deref(), Some("<p>x</p>"));
        assert_eq!(ctx.host().attribute(&shadow, "name").as_deref(), Some("body"));

        ctx.host().set_inner_html(&root, "<p>changed</p>");
        ctx.handle_interaction("body", Interaction::new(InteractionKind::Blur));
        assert_eq!(ctx.host().value(&shadow).as_deref(), Some("<p>changed</p>"));
    }

    #[test]
    fn test_ids_fall_back_to_counter() {
        let mut ctx = context();
        let a = ctx.host().mount("");
        let b = ctx.host().mount("");
        assert_eq!(ctx.create_editor(a, EditorConfig::default()).unwrap(), "1");
        assert_eq!(ctx.create_editor(b, EditorConfig::default()).unwrap(), "2");
    }

    #[test]
    fn test_existing_id_returns_existing_editor() {
        let mut ctx = context();
        let a = ctx.host().mount("");
        let b = ctx.host().mount("");
        ctx.create_editor(a.clone(), EditorConfig::default().with_id("x")).unwrap();
        ctx.create_editor(b.clone(), EditorConfig::default().with_id("x")).unwrap();
        assert_eq!(ctx.editors().all().len(), 1);
        assert_eq!(ctx.editor("x").unwrap().root(), &a);
        assert_eq!(ctx.host().attribute(&b, "data-editor-id"), None);
    }

    #[test]
    fn test_config_listeners_stay_on_their_editor() {
        let mut ctx = context();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let options = EditorConfig::default()
            .with_id("a")
            .on::<MemoryHost>(EventKind::EditorCreated, {
                let s = seen.clone();
                move |_, event| s.borrow_mut().push(format!("created {}", event.editor().unwrap()))
            })
            .on(EventKind::Editor(InteractionKind::Click), move |_, event| {
                s.borrow_mut().push(format!("click {}", event.editor().unwrap()))
            });

        let a = ctx.host().mount("");
        let b = ctx.host().mount("");
        ctx.create_editor(a, options).unwrap();
        ctx.create_editor(b, EditorConfig::default().with_id("b")).unwrap();

        ctx.handle_interaction("b", Interaction::new(InteractionKind::Click));
        ctx.handle_interaction("a", Interaction::new(InteractionKind::Click));
        assert_eq!(*seen.borrow(), vec!["created a", "click a"]);
    }

    #[test]
    fn test_register_reads_attribute_config() {
        let mut ctx = context();
        let wrapper = ctx.host().mount(
            r#"<div data-editor='{"id": 7, "newline": "false"}'></div><div data-editor="{not json"></div>"#,
        );
        let registered = Rc::new(RefCell::new(false));
        let r = registered.clone();
        ctx.listen(EventKind::EditorsRegistered, move |_, _| *r.borrow_mut() = true);

        ctx.register();
        assert!(*registered.borrow());
        assert_eq!(ctx.editors().ids(), vec![EditorId::new("7"), EditorId::new("1")]);
        assert!(!ctx.editor("7").unwrap().config().newline);
        assert!(ctx.editor("7").unwrap().config().registered);
        assert!(ctx.host().find_with_attribute(Some(&wrapper), REGISTER_ATTRIBUTE).is_empty());
    }

    #[test]
    fn test_keydown_wraps_empty_surface_once() {
        let mut ctx = context();
        let root = ctx.host().mount("");
        let id = ctx.create_editor(root.clone(), EditorConfig::default()).unwrap();

        ctx.handle_interaction(&id, Interaction::key(InteractionKind::KeyDown, Key::character("a")));
        ctx.handle_interaction(&id, Interaction::key(InteractionKind::KeyDown, Key::character("b")));
        assert_eq!(ctx.host().inner_html(&root), "<p>\u{200B}</p>");
        let p = ctx.host().first_with_tag(&root, "p").unwrap();
        assert_eq!(ctx.host().selection().map(|s| s.container), Some(p));
    }

    #[test]
    fn test_keydown_deletion_does_not_wrap() {
        let mut ctx = context();
        let root = ctx.host().mount(" ");
        let id = ctx
            .create_editor(root.clone(), EditorConfig::default())
            .unwrap();
        ctx.handle_interaction(&id, Interaction::key(InteractionKind::KeyDown, Key::Backspace));
        assert_eq!(ctx.host().children(&root).len(), 0);
    }

    #[test]
    fn test_configured_wrap_tag() {
        let mut ctx = context();
        let root = ctx.host().mount("");
        let config: EditorConfig = EditorConfig::parse(r#"{"wrapAfterEmpty": "div"}"#).unwrap();
        let id = ctx.create_editor(root.clone(), config).unwrap();
        ctx.handle_interaction(&id, Interaction::key(InteractionKind::KeyDown, Key::character("a")));
        assert!(ctx.host().first_with_tag(&root, "div").is_some());
    }

    #[test]
    fn test_keypress_enter_suppressed_without_newline() {
        let mut ctx = context();
        let root = ctx.host().mount("");
        let id = ctx
            .create_editor(root, EditorConfig::default().with_newline(false))
            .unwrap();

        let enter = ctx.handle_interaction(&id, Interaction::key(InteractionKind::KeyPress, Key::Enter));
        let shift_enter = ctx.handle_interaction(
            &id,
            Interaction::key(InteractionKind::KeyPress, Key::Enter).with_shift(true),
        );
        let letter = ctx.handle_interaction(&id, Interaction::key(InteractionKind::KeyPress, Key::character("a")));
        assert_eq!(enter, InteractionOutcome::PREVENT);
        assert_eq!(shift_enter, InteractionOutcome::PASS);
        assert_eq!(letter, InteractionOutcome::PASS);
    }

    #[test]
    fn test_mouseup_with_selection_opens_toolbar() {
        let mut ctx = context();
        let root = ctx.host().mount("<p>hello world</p>");
        let id = ctx.create_editor(root.clone(), EditorConfig::default()).unwrap();
        let p = ctx.host().first_with_tag(&root, "p").unwrap();

        ctx.handle_interaction(&id, Interaction::mouse(InteractionKind::MouseDown, Point::new(300.0, 40.0)));
        assert_eq!(ctx.active_editor_id(), Some(id.clone()));

        ctx.handle_interaction(&id, Interaction::mouse(InteractionKind::MouseUp, Point::new(300.0, 40.0)));
        assert!(!ctx.toolbar(&id).unwrap().is_open());

        ctx.host().select_text(&p, 0, 5);
        ctx.handle_interaction(&id, Interaction::mouse(InteractionKind::MouseUp, Point::new(300.0, 40.0)));
        let toolbar = ctx.toolbar(&id).unwrap();
        assert!(toolbar.is_open());
        assert!(ctx.host().has_class(toolbar.element(), OPEN_CLASS));
        assert_eq!(ctx.toolbars().open_id().map(|t| t.as_str()), Some(id.as_str()));
    }

    #[test]
    fn test_mousedown_closes_toolbars() {
        let mut ctx = context();
        let root = ctx.host().mount("");
        let id = ctx.create_editor(root, EditorConfig::default()).unwrap();
        ctx.open_toolbar(&id, false, false);
        ctx.handle_interaction(&id, Interaction::new(InteractionKind::MouseDown));
        assert!(!ctx.toolbar(&id).unwrap().is_open());
    }

    #[test]
    fn test_outside_click_clears_active() {
        let mut ctx = context();
        let root = ctx.host().mount("<p>x</p>");
        let outside = ctx.host().mount("<span>elsewhere</span>");
        let id = ctx.create_editor(root.clone(), EditorConfig::default()).unwrap();
        ctx.set_active_editor(&id);
        ctx.open_toolbar(&id, false, false);

        let p = ctx.host().first_with_tag(&root, "p").unwrap();
        assert!(!ctx.handle_outside_click(Some(&p)));
        assert!(ctx.active_editor_id().is_some());

        assert!(ctx.handle_outside_click(Some(&outside)));
        assert!(ctx.active_editor_id().is_none());
        assert!(!ctx.toolbar(&id).unwrap().is_open());
    }

    #[test]
    fn test_source_mode_round_trip() {
        let mut ctx = context();
        let root = ctx.host().mount("<p>a <b>b</b></p>");
        ctx.add_template(ToolbarItem::button("bold").command(Command::new("bold")));
        ctx.add_template(ToolbarItem::button("sourcecode"));
        let id = ctx.create_editor(root.clone(), EditorConfig::default()).unwrap();

        assert!(ctx.enter_source_mode(&id, &["sourcecode"]));
        assert!(!ctx.host().is_content_editable(&root));
        assert_eq!(ctx.code(&id).as_deref(), Some("<p>a <b>b</b></p>"));
        let pre = ctx.host().first_with_tag(&root, "pre").unwrap();
        assert!(ctx.host().is_content_editable(&pre));
        let toolbar = ctx.toolbar(&id).unwrap();
        assert!(toolbar.get("bold").unwrap().disabled);
        assert!(!toolbar.get("sourcecode").unwrap().disabled);

        ctx.host().set_text_content(&pre, "<p>edited</p>");
        assert!(ctx.leave_source_mode(&id));
        assert!(ctx.host().is_content_editable(&root));
        insta::assert_snapshot!(ctx.host().inner_html(&root), @"<p>edited</p>");
        assert!(!ctx.toolbar(&id).unwrap().get("bold").unwrap().disabled);
    }

    #[test]
    fn test_destroy_editor() {
        let mut ctx = context();
        let root = ctx.host().mount("<p>x</p>");
        let id = ctx.create_editor(root.clone(), EditorConfig::default()).unwrap();
        ctx.set_active_editor(&id);
        let toolbar_el = ctx.toolbar(&id).unwrap().element().clone();

        let order = Rc::new(RefCell::new(Vec::new()));
        let o = order.clone();
        ctx.listen(EventKind::EditorDestroyed, move |_, _| o.borrow_mut().push("global"));
        let o = order.clone();
        ctx.listen_editor(&id, EventKind::EditorDestroyed, move |_, _| o.borrow_mut().push("local"));

        assert!(ctx.destroy_editor(&id));
        assert_eq!(*order.borrow(), vec!["global", "local"]);
        assert!(!ctx.host().is_attached(&toolbar_el));
        assert!(!ctx.toolbars().has(&id));
        assert!(ctx.editors().all().is_empty());
        assert!(ctx.active_editor_id().is_none());
        assert_eq!(ctx.host().attribute(&root, "data-editor-id"), None);
        assert!(!ctx.host().is_content_editable(&root));
        assert_eq!(ctx.host().inner_html(&root), "<p>x</p>");
    }
}
