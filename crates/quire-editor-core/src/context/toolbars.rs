//! Toolbar operations on the context: lifecycle, building, item dispatch.

use std::time::Duration;

use smol_str::SmolStr;
use web_time::Instant;

use super::EditorContext;
use crate::error::HostError;
use crate::event::{BuildRequest, EditorEvent};
use crate::host::{EditingHost, Point};
use crate::interaction::Interaction;
use crate::toolbar::{
    ItemParams, ItemTrigger, LastPosition, MatchField, OPEN_CLASS, Placement, PositionRequest,
    Toolbar, ToolbarItem, Undo, compute_position,
};
use crate::types::ToolbarId;

/// A pending keyup handler the host should flush after `delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyupSchedule {
    pub toolbar: ToolbarId,
    pub item: SmolStr,
    pub ticket: u64,
    pub delay: Duration,
}

impl<H: EditingHost> EditorContext<H> {
    /// Create a toolbar. An existing id returns that toolbar's id unchanged.
    pub fn create_toolbar(&mut self, id: Option<ToolbarId>) -> Result<ToolbarId, HostError> {
        let id = match id {
            Some(id) => id,
            None => ToolbarId::new(self.next_id()),
        };
        if self.toolbars.has(&id) {
            return Ok(id);
        }
        let toolbar = Toolbar::new(&self.host, id.clone())?;
        tracing::debug!(target: "quire::toolbar", toolbar = %id, "created toolbar");
        self.toolbars.insert(toolbar);
        Ok(id)
    }

    pub fn toolbar_mut(&mut self, id: &str) -> Option<&mut Toolbar<H>> {
        self.toolbars.get_mut(id)
    }

    /// Open a toolbar.
    ///
    /// With `set_active`, items are marked active when their tag name encloses
    /// the active editor's selection.
    pub fn open_toolbar(&mut self, id: &str, set_active: bool, fire: bool) {
        let tags = if set_active {
            self.enclosing_tag_names()
        } else {
            Vec::new()
        };
        let Some(toolbar) = self.toolbars.get_mut(id) else {
            tracing::debug!(target: "quire::toolbar", toolbar = id, "open: unknown toolbar");
            return;
        };

        toolbar.is_open = true;
        self.host.add_class(toolbar.element(), OPEN_CLASS);
        if set_active {
            toolbar.set_active(&self.host, &tags, MatchField::TagName, true);
        }
        let toolbar_id = toolbar.id().clone();

        if self.toolbars.last_id.is_none() {
            self.toolbars.last_id = Some(toolbar_id.clone());
        }
        self.toolbars.open_id = Some(toolbar_id.clone());
        tracing::trace!(target: "quire::toolbar", toolbar = %toolbar_id, "opened");

        if fire {
            self.fire(EditorEvent::ToolbarOpened {
                toolbar: toolbar_id,
            });
        }
    }

    /// Close a toolbar. `toolbar.closed` only fires when it was open.
    ///
    /// Closing the open toolbar moves its id to `last_id` and leaves
    /// `open_id` empty.
    pub fn close_toolbar(&mut self, id: &str, fire: bool) {
        let Some(toolbar) = self.toolbars.get_mut(id) else {
            return;
        };

        self.host.remove_class(toolbar.element(), OPEN_CLASS);
        let was_open = toolbar.is_open;
        toolbar.is_open = false;
        let toolbar_id = toolbar.id().clone();

        if self.toolbars.open_id.as_ref() == Some(&toolbar_id) {
            self.toolbars.last_id = Some(toolbar_id.clone());
            self.toolbars.open_id = None;
        }

        if was_open && fire {
            tracing::trace!(target: "quire::toolbar", toolbar = %toolbar_id, "closed");
            self.fire(EditorEvent::ToolbarClosed {
                toolbar: toolbar_id,
            });
        }
    }

    /// Close every toolbar not in `except` and not kept open. With
    /// `clear_keep_open`, keep-open flags are dropped first.
    pub fn close_toolbars(&mut self, except: &[&str], clear_keep_open: bool) {
        for id in self.toolbars.ids() {
            if except.contains(&id.as_str()) {
                if clear_keep_open && let Some(toolbar) = self.toolbars.get_mut(&id) {
                    toolbar.keep_open(false);
                }
                continue;
            }
            let Some(toolbar) = self.toolbars.get_mut(&id) else {
                continue;
            };
            if clear_keep_open {
                toolbar.keep_open(false);
            }
            if !toolbar.is_kept_open() {
                self.close_toolbar(&id, true);
            }
        }
    }

    /// Register an item template. `toolbars.item` listeners may rewrite it
    /// before it is stored.
    pub fn add_template(&mut self, item: ToolbarItem<H>) {
        if let EditorEvent::ToolbarsItem(item) = self.fire(EditorEvent::ToolbarsItem(Box::new(item))) {
            tracing::trace!(target: "quire::toolbar", item = %item.key, "stored template");
            self.toolbars.store_template(*item);
        }
    }

    /// Add template copies to a toolbar.
    ///
    /// Without `keys` the default set is built. `toolbar.build` listeners see
    /// the request first and may change keys and params.
    pub fn build_toolbar(&mut self, id: &str, keys: Option<Vec<SmolStr>>, params: ItemParams) {
        let request = BuildRequest {
            toolbar: ToolbarId::new(id),
            items: keys,
            params,
        };
        let EditorEvent::ToolbarBuild(request) = self.fire(EditorEvent::ToolbarBuild(request)) else {
            return;
        };

        let keys = request.items.unwrap_or_else(|| self.toolbars.default_keys());
        for key in keys {
            let Some(template) = self.toolbars.template(&key) else {
                tracing::debug!(target: "quire::toolbar", toolbar = %request.toolbar, item = %key, "no template for item");
                continue;
            };
            let mut item = template.clone();
            item.reset_state();
            item.apply_params(&request.params);
            self.add_item(&request.toolbar, item);
        }
    }

    /// Create `item`'s element and add it to a toolbar. An item with the same
    /// key is replaced in place. Returns the key, generated when empty.
    pub fn add_item(&mut self, toolbar: &str, mut item: ToolbarItem<H>) -> Option<SmolStr> {
        if !self.toolbars.has(toolbar) {
            tracing::debug!(target: "quire::toolbar", toolbar, "add_item: unknown toolbar");
            return None;
        }
        if item.key.is_empty() {
            item.key = self.next_id();
        }

        let el = match self.host.create_element(&item.element_spec()) {
            Ok(el) => el,
            Err(e) => {
                tracing::warn!(target: "quire::toolbar", item = %item.key, error = %e, "failed to create item element");
                return None;
            }
        };
        self.host.set_attribute(&el, "data-item-key", &item.key);
        if let Some(title) = &item.title {
            self.host.set_attribute(&el, "title", &self.trans(title));
        }
        item.set_debounce_interval(self.settings.keyup_debounce());

        let host = &self.host;
        let tb = self.toolbars.get_mut(toolbar)?;
        item.toolbar = Some(tb.id().clone());

        let existing = tb.items.iter().position(|i| i.key == item.key);
        let placed = match (existing.and_then(|i| tb.items[i].el.clone()), &item.placement) {
            (Some(old), _) => host.replace_node(&old, &el),
            (None, Placement::Append) => host.append_child(tb.element(), &el),
            (None, Placement::After(sibling)) => match tb.item_element(sibling) {
                Some(sibling) => host.insert_after(&sibling, &el),
                None => {
                    tracing::debug!(target: "quire::toolbar", item = %item.key, after = %sibling, "sibling missing, appending");
                    host.append_child(tb.element(), &el)
                }
            },
            (None, Placement::Into(container)) => host.append_child(container, &el),
        };
        if let Err(e) = placed {
            tracing::warn!(target: "quire::toolbar", item = %item.key, error = %e, "failed to place item element");
            return None;
        }

        item.el = Some(el);
        let key = item.key.clone();
        match existing {
            Some(index) => tb.items[index] = item,
            None => tb.items.push(item),
        }
        tb.invalidate_size();
        Some(key)
    }

    /// Place a toolbar and remember its geometry for later `use_last`
    /// requests.
    pub fn position_toolbar(&mut self, id: &str, request: PositionRequest) -> Option<Point> {
        let selection = self.host.selection_rect();
        let viewport = self.host.viewport_width();
        let last = self.toolbars.last;

        let toolbar = self.toolbars.get_mut(id)?;
        let size = toolbar.measured_size(&self.host);
        let at = compute_position(&request, selection, size.width, viewport, last, &self.settings);
        toolbar.position = at;
        self.host.place(toolbar.element(), at);

        self.toolbars.last = Some(LastPosition {
            width: size.width,
            x: at.x,
            y: at.y,
        });
        Some(at)
    }

    /// Run an item's command against an editor, honouring its undo policy
    /// when the item is active. The editor is refocused afterwards.
    pub fn exec_item_command(&mut self, toolbar: &str, key: &str, editor: &str) {
        let Some(item) = self.toolbars.get(toolbar).and_then(|t| t.get(key)) else {
            return;
        };
        let Some(editor) = self.editors.get(editor) else {
            return;
        };
        let command = item.command.clone();
        let current = editor.selection().current(&self.host);

        let run = if !item.active {
            command
        } else {
            match &item.undo {
                Undo::Repeat => command,
                Undo::Run(undo) => Some(undo.clone()),
                Undo::Unwrap if current.has_text() => command,
                Undo::Unwrap => {
                    if let Some(el) = current.element.filter(|el| el != editor.root())
                        && let Err(e) = self.host.unwrap_node(&el)
                    {
                        tracing::warn!(target: "quire::toolbar", item = key, error = %e, "failed to unwrap element");
                    }
                    None
                }
            }
        };

        if let Some(command) = run {
            tracing::trace!(target: "quire::toolbar", item = key, command = %command.name, "exec");
            if let Err(e) = self.host.exec_command(&command.name, command.value.as_deref()) {
                tracing::warn!(target: "quire::toolbar", command = %command.name, error = %e, "command failed");
            }
        }
        self.host.focus(editor.root());
    }

    fn item_trigger(
        &self,
        toolbar: &str,
        key: &str,
        interaction: Option<Interaction<H::Node>>,
        value: Option<String>,
    ) -> ItemTrigger<H::Node> {
        ItemTrigger {
            toolbar: ToolbarId::new(toolbar),
            item: SmolStr::new(key),
            editor: self.editors.active_id().cloned(),
            interaction,
            value,
        }
    }

    /// Dispatch a click on an item: its click handler runs first, then its
    /// command against the active editor. Disabled items ignore clicks.
    pub fn item_click(&mut self, toolbar: &str, key: &str, interaction: Option<Interaction<H::Node>>) {
        let Some(item) = self.toolbars.get(toolbar).and_then(|t| t.get(key)) else {
            return;
        };
        if item.disabled {
            tracing::trace!(target: "quire::toolbar", item = key, "click on disabled item");
            return;
        }
        let click = item.click.clone();
        let has_command = item.command.is_some();

        if let Some(click) = click {
            let trigger = self.item_trigger(toolbar, key, interaction, None);
            click(self, &trigger);
        }

        if has_command && let Some(editor) = self.editors.active_id().cloned() {
            self.exec_item_command(toolbar, key, &editor);
            let tags = self.enclosing_tag_names();
            if let Some(tb) = self.toolbars.get_mut(toolbar) {
                tb.set_active(&self.host, &tags, MatchField::TagName, true);
            }
        }
    }

    /// Dispatch a change on a control; the handler receives its value.
    pub fn item_change(&mut self, toolbar: &str, key: &str) {
        let Some(item) = self.toolbars.get(toolbar).and_then(|t| t.get(key)) else {
            return;
        };
        let Some(change) = item.change.clone() else {
            return;
        };
        let value = item.el.as_ref().and_then(|el| self.host.value(el));
        let trigger = self.item_trigger(toolbar, key, None, value);
        change(self, &trigger);
    }

    /// Record a keyup on a control. The handler runs once the returned
    /// schedule is flushed, unless a later keyup superseded it.
    pub fn item_keyup(
        &mut self,
        toolbar: &str,
        key: &str,
        interaction: Option<Interaction<H::Node>>,
    ) -> Option<KeyupSchedule> {
        let value = {
            let item = self.toolbars.get(toolbar)?.get(key)?;
            item.keyup.as_ref()?;
            item.el.as_ref().and_then(|el| self.host.value(el))
        };
        let trigger = self.item_trigger(toolbar, key, interaction, value);
        let item = self.toolbars.get_mut(toolbar)?.get_mut(key)?;
        let ticket = item.keyup_debounce.trigger(trigger);
        Some(KeyupSchedule {
            toolbar: ToolbarId::new(toolbar),
            item: SmolStr::new(key),
            ticket,
            delay: item.keyup_debounce.interval(),
        })
    }

    /// Run a scheduled keyup handler if `ticket` is still the latest one.
    pub fn flush_keyup(&mut self, toolbar: &str, key: &str, ticket: u64) -> bool {
        let Some(item) = self.toolbars.get_mut(toolbar).and_then(|t| t.get_mut(key)) else {
            return false;
        };
        let Some(mut trigger) = item.keyup_debounce.take(ticket) else {
            return false;
        };
        let Some(keyup) = item.keyup.clone() else {
            return false;
        };
        trigger.value = item.el.as_ref().and_then(|el| self.host.value(el));
        keyup(self, &trigger);
        true
    }

    /// Run every keyup handler whose interval has elapsed at `now`.
    pub fn poll_keyups(&mut self, now: Instant) -> usize {
        let mut due = Vec::new();
        for toolbar in self.toolbars.iter_mut() {
            for item in &mut toolbar.items {
                if let Some(keyup) = &item.keyup
                    && let Some(trigger) = item.keyup_debounce.poll(now)
                {
                    due.push((keyup.clone(), trigger));
                }
            }
        }
        let count = due.len();
        for (keyup, trigger) in due {
            keyup(self, &trigger);
        }
        count
    }

    /// Remove a toolbar and its surface.
    pub fn destroy_toolbar(&mut self, id: &str) -> bool {
        let Some(toolbar) = self.toolbars.remove(id) else {
            return false;
        };
        if let Err(e) = self.host.remove_node(toolbar.element()) {
            tracing::warn!(target: "quire::toolbar", toolbar = id, error = %e, "failed to remove toolbar element");
        }
        tracing::debug!(target: "quire::toolbar", toolbar = id, "destroyed toolbar");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::EditorConfig;
    use crate::event::EventKind;
    use crate::host::{Rect, Size};
    use crate::memory::MemoryHost;
    use crate::toolbar::Command;

    fn context() -> EditorContext<MemoryHost> {
        EditorContext::new(MemoryHost::new())
    }

    fn closed_events(ctx: &mut EditorContext<MemoryHost>) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        ctx.listen(EventKind::ToolbarClosed, move |_, event| {
            if let Some(id) = event.toolbar() {
                s.borrow_mut().push(id.to_string());
            }
        });
        seen
    }

    #[test]
    fn test_closing_unopened_toolbar_fires_nothing() {
        let mut ctx = context();
        let seen = closed_events(&mut ctx);
        ctx.create_toolbar(Some("t".into())).unwrap();
        ctx.close_toolbar("t", true);
        assert!(seen.borrow().is_empty());

        ctx.open_toolbar("t", false, true);
        ctx.close_toolbar("t", true);
        ctx.close_toolbar("t", true);
        assert_eq!(*seen.borrow(), vec!["t".to_string()]);
    }

    #[test]
    fn test_open_fires_only_when_asked() {
        let mut ctx = context();
        let opened = Rc::new(RefCell::new(Vec::new()));
        let o = opened.clone();
        ctx.listen(EventKind::ToolbarOpened, move |_, event| {
            if let Some(id) = event.toolbar() {
                o.borrow_mut().push(id.to_string());
            }
        });
        ctx.create_toolbar(Some("t".into())).unwrap();
        ctx.create_toolbar(Some("u".into())).unwrap();

        ctx.open_toolbar("t", false, true);
        ctx.open_toolbar("u", false, false);
        assert_eq!(*opened.borrow(), vec!["t"]);
        assert!(ctx.toolbar("u").unwrap().is_open());
    }

    #[test]
    fn test_open_close_tracks_ids() {
        let mut ctx = context();
        ctx.create_toolbar(Some("a".into())).unwrap();
        ctx.create_toolbar(Some("b".into())).unwrap();

        ctx.open_toolbar("a", false, false);
        assert_eq!(ctx.toolbars().open_id().map(|i| i.as_str()), Some("a"));
        assert_eq!(ctx.toolbars().last_id().map(|i| i.as_str()), Some("a"));
        let el = ctx.toolbar("a").unwrap().element().clone();
        assert!(ctx.host().has_class(&el, OPEN_CLASS));

        ctx.open_toolbar("b", false, false);
        ctx.close_toolbar("b", false);
        assert_eq!(ctx.toolbars().open_id(), None);
        assert_eq!(ctx.toolbars().last_id().map(|i| i.as_str()), Some("b"));
    }

    #[test]
    fn test_close_with_exception() {
        let mut ctx = context();
        ctx.create_toolbar(Some("link".into())).unwrap();
        ctx.create_toolbar(Some("table".into())).unwrap();
        ctx.open_toolbar("link", false, false);
        ctx.open_toolbar("table", false, false);

        ctx.close_toolbars(&["link"], false);
        assert!(ctx.toolbar("link").unwrap().is_open());
        assert!(!ctx.toolbar("table").unwrap().is_open());
    }

    #[test]
    fn test_keep_open_survives_sweep() {
        let mut ctx = context();
        ctx.create_toolbar(Some("k".into())).unwrap();
        ctx.open_toolbar("k", false, false);
        ctx.toolbar_mut("k").unwrap().keep_open(true);

        ctx.close_toolbars(&[], false);
        assert!(ctx.toolbar("k").unwrap().is_open());
        ctx.close_toolbars(&[], true);
        assert!(!ctx.toolbar("k").unwrap().is_open());
        assert!(!ctx.toolbar("k").unwrap().is_kept_open());
    }

    #[test]
    fn test_default_build_filters_templates() {
        let mut ctx = context();
        ctx.add_template(ToolbarItem::button("bold"));
        ctx.add_template(ToolbarItem::select("style"));
        ctx.add_template(ToolbarItem::button("back").build_default(false));
        ctx.add_template(ToolbarItem::input("url", "text"));
        ctx.create_toolbar(Some("t".into())).unwrap();

        ctx.build_toolbar("t", None, ItemParams::default());
        assert_eq!(ctx.toolbar("t").unwrap().keys(), vec!["bold", "style"]);
    }

    #[test]
    fn test_build_listener_rewrites_request() {
        let mut ctx = context();
        ctx.add_template(ToolbarItem::button("bold"));
        ctx.add_template(ToolbarItem::button("italic"));
        ctx.listen(EventKind::ToolbarBuild, |_, event| {
            if let EditorEvent::ToolbarBuild(request) = event {
                request.items = Some(vec!["italic".into()]);
                request.params.classes.push("extra".into());
            }
        });
        ctx.create_toolbar(Some("t".into())).unwrap();
        ctx.build_toolbar("t", None, ItemParams::default());

        let toolbar = ctx.toolbar("t").unwrap();
        assert_eq!(toolbar.keys(), vec!["italic"]);
        let el = toolbar.item_element("italic").unwrap();
        assert!(ctx.host().has_class(&el, "extra"));
    }

    #[test]
    fn test_template_listener_can_modify_item() {
        let mut ctx = context();
        ctx.listen(EventKind::ToolbarsItem, |_, event| {
            if let EditorEvent::ToolbarsItem(item) = event
                && item.key == "bold"
            {
                item.title = Some("Strong".into());
            }
        });
        ctx.add_template(ToolbarItem::button("bold").title("Bold"));
        assert_eq!(ctx.toolbars().template("bold").unwrap().title.as_deref(), Some("Strong"));
    }

    #[test]
    fn test_add_item_element_and_placement() {
        let mut ctx = context();
        ctx.create_toolbar(Some("t".into())).unwrap();
        ctx.add_item("t", ToolbarItem::button("a").title("First"));
        ctx.add_item("t", ToolbarItem::button("c"));
        ctx.add_item("t", ToolbarItem::button("b").after("a"));
        let generated = ctx.add_item("t", ToolbarItem::button("")).unwrap();
        assert!(!generated.is_empty());

        let toolbar = ctx.toolbar("t").unwrap();
        let el = toolbar.element().clone();
        let a = toolbar.item_element("a").unwrap();
        let order: Vec<_> = ctx
            .host()
            .children(&el)
            .iter()
            .filter_map(|c| ctx.host().attribute(c, "data-item-key"))
            .collect();
        assert_eq!(order, vec!["a", "b", "c", generated.as_str()]);
        assert_eq!(ctx.host().attribute(&a, "title").as_deref(), Some("First"));
    }

    #[test]
    fn test_add_item_replaces_same_key() {
        let mut ctx = context();
        ctx.create_toolbar(Some("t".into())).unwrap();
        ctx.add_item("t", ToolbarItem::button("a").html("old"));
        ctx.add_item("t", ToolbarItem::button("a").html("new"));

        let toolbar = ctx.toolbar("t").unwrap();
        assert_eq!(toolbar.keys(), vec!["a"]);
        let el = toolbar.element().clone();
        assert_eq!(ctx.host().children(&el).len(), 1);
        insta::assert_snapshot!(ctx.host().inner_html(&el), @r#"<button data-item-key="a">new</button>"#);
    }

    #[test]
    fn test_position_stays_in_viewport() {
        let mut ctx = context();
        let root = ctx.host().mount("<p>near the edge</p>");
        let p = ctx.host().first_with_tag(&root, "p").unwrap();
        ctx.host().select_text(&p, 9, 13);
        ctx.create_toolbar(Some("t".into())).unwrap();
        let el = ctx.toolbar("t").unwrap().element().clone();
        ctx.host().set_element_size(&el, Size::new(300.0, 40.0));
        ctx.host().set_viewport_width(800.0);
        ctx.host().set_selection_rect(Some(Rect::new(780.0, 50.0, 10.0, 20.0)));

        let at = ctx.position_toolbar("t", PositionRequest::default()).unwrap();
        assert_eq!(at, Point::new(800.0 - 300.0 - 10.0, 75.0));
        assert_eq!(ctx.host().position(&el), Some(at));
        assert_eq!(
            ctx.toolbars().last_position(),
            Some(LastPosition {
                width: 300.0,
                x: at.x,
                y: at.y
            })
        );
    }

    fn bold_setup() -> (EditorContext<MemoryHost>, crate::memory::NodeRef) {
        let mut ctx = context();
        let root = ctx.host().mount("<p>plain <b>strong</b></p>");
        ctx.add_template(
            ToolbarItem::button("bold")
                .command(Command::new("bold"))
                .undo(Undo::Unwrap)
                .tag_name("b"),
        );
        let id = ctx
            .create_editor(root.clone(), EditorConfig::default().with_id("e").with_toolbar(["bold"]))
            .unwrap();
        ctx.set_active_editor(&id);
        (ctx, root)
    }

    #[test]
    fn test_inactive_item_runs_command() {
        let (mut ctx, root) = bold_setup();
        let p = ctx.host().first_with_tag(&root, "p").unwrap();
        ctx.host().select_text(&p, 0, 5);

        ctx.item_click("e", "bold", None);
        let commands = ctx.host().executed_commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name, "bold");
        assert_eq!(ctx.host().focused(), Some(root));
    }

    #[test]
    fn test_active_item_with_text_repeats_command() {
        let (mut ctx, root) = bold_setup();
        let b = ctx.host().first_with_tag(&root, "b").unwrap();
        ctx.host().select_text(&b, 0, 3);
        ctx.with_toolbar("e", |tb, host| tb.set_active_item(host, "bold"));

        ctx.item_click("e", "bold", None);
        assert_eq!(ctx.host().executed_commands().len(), 1);
        assert_eq!(ctx.host().executed_commands()[0].name, "bold");
    }

    #[test]
    fn test_active_item_with_caret_unwraps() {
        let (mut ctx, root) = bold_setup();
        let b = ctx.host().first_with_tag(&root, "b").unwrap();
        ctx.host().select_text(&b, 2, 2);
        ctx.with_toolbar("e", |tb, host| tb.set_active_item(host, "bold"));

        ctx.item_click("e", "bold", None);
        assert!(ctx.host().executed_commands().is_empty());
        insta::assert_snapshot!(ctx.host().inner_html(&root), @"<p>plain strong</p>");
        assert!(!ctx.toolbar("e").unwrap().get("bold").unwrap().active);
    }

    #[test]
    fn test_undo_command_runs_when_active() {
        let mut ctx = context();
        let root = ctx.host().mount("<h1>title</h1>");
        ctx.add_template(
            ToolbarItem::button("h1")
                .command(Command::with_value("formatblock", "<h1>"))
                .undo(Undo::Run(Command::with_value("formatblock", "<p>")))
                .tag_name("h1"),
        );
        let id = ctx
            .create_editor(root, EditorConfig::default().with_toolbar(["h1"]))
            .unwrap();
        ctx.set_active_editor(&id);
        ctx.with_toolbar(&id, |tb, host| tb.set_active_item(host, "h1"));

        ctx.item_click(&id, "h1", None);
        let commands = ctx.host().executed_commands();
        assert_eq!(commands[0].value.as_deref(), Some("<p>"));
    }

    #[test]
    fn test_disabled_item_ignores_click() {
        let (mut ctx, _) = bold_setup();
        let clicks = Rc::new(RefCell::new(0));
        let c = clicks.clone();
        ctx.add_item("e", ToolbarItem::button("x").on_click(move |_, _| *c.borrow_mut() += 1));
        ctx.with_toolbar("e", |tb, host| tb.disable(host, "x", false));
        ctx.item_click("e", "x", None);
        assert_eq!(*clicks.borrow(), 0);
    }

    #[test]
    fn test_change_handler_receives_value() {
        let mut ctx = context();
        ctx.create_toolbar(Some("t".into())).unwrap();
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        ctx.add_item(
            "t",
            ToolbarItem::select("style")
                .options([("Red", "red"), ("Blue", "blue")])
                .on_change(move |_, trigger| *s.borrow_mut() = trigger.value.clone()),
        );
        let el = ctx.toolbar("t").unwrap().item_element("style").unwrap();
        ctx.host().set_value(&el, "blue");
        ctx.item_change("t", "style");
        assert_eq!(seen.borrow().as_deref(), Some("blue"));
    }

    #[test]
    fn test_keyup_runs_latest_only() {
        let mut ctx = context();
        ctx.create_toolbar(Some("t".into())).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        ctx.add_item(
            "t",
            ToolbarItem::input("url", "text").on_keyup(move |_, trigger| {
                s.borrow_mut().push(trigger.value.clone().unwrap_or_default())
            }),
        );
        let el = ctx.toolbar("t").unwrap().item_element("url").unwrap();

        ctx.host().set_value(&el, "h");
        let first = ctx.item_keyup("t", "url", None).unwrap();
        ctx.host().set_value(&el, "ht");
        let second = ctx.item_keyup("t", "url", None).unwrap();
        assert_eq!(second.delay, Duration::from_millis(200));

        assert!(!ctx.flush_keyup("t", "url", first.ticket));
        assert!(ctx.flush_keyup("t", "url", second.ticket));
        assert_eq!(*seen.borrow(), vec!["ht".to_string()]);
    }

    #[test]
    fn test_poll_keyups_after_interval() {
        let mut ctx = context();
        ctx.create_toolbar(Some("t".into())).unwrap();
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        ctx.add_item("t", ToolbarItem::input("q", "text").on_keyup(move |_, _| *h.borrow_mut() += 1));
        ctx.item_keyup("t", "q", None).unwrap();

        assert_eq!(ctx.poll_keyups(Instant::now()), 0);
        assert_eq!(ctx.poll_keyups(Instant::now() + Duration::from_millis(250)), 1);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_destroy_toolbar_removes_surface() {
        let mut ctx = context();
        ctx.create_toolbar(Some("t".into())).unwrap();
        ctx.open_toolbar("t", false, false);
        let el = ctx.toolbar("t").unwrap().element().clone();

        assert!(ctx.destroy_toolbar("t"));
        assert!(!ctx.host().is_attached(&el));
        assert_eq!(ctx.toolbars().open_id(), None);
        assert!(!ctx.destroy_toolbar("t"));
    }
}
