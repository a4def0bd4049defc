//! The application context.
//!
//! [`EditorContext`] owns the host, the editor and toolbar registries, the
//! plugin registry, the global event bus, the translator and the settings.
//! Every operation that crosses component boundaries is a method here, so
//! listeners and item handlers (which receive `&mut EditorContext`) can
//! drive the whole widget.

mod editors;
mod toolbars;

pub use toolbars::KeyupSchedule;

use smol_str::SmolStr;

use crate::config::Settings;
use crate::editor::{Editor, EditorRegistry};
use crate::event::{EditorEvent, EventBus, EventKind, ListenerId};
use crate::host::EditingHost;
use crate::i18n::{Catalog, Translator};
use crate::plugin::{Plugin, PluginRegistry};
use crate::toolbar::{Toolbar, ToolbarRegistry};

pub struct EditorContext<H: EditingHost> {
    host: H,
    settings: Settings,
    translator: Box<dyn Translator>,
    bus: EventBus<H>,
    editors: EditorRegistry<H>,
    toolbars: ToolbarRegistry<H>,
    plugins: PluginRegistry,
    next_id: u64,
}

impl<H: EditingHost> std::fmt::Debug for EditorContext<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("settings", &self.settings)
            .field("editors", &self.editors.ids())
            .field("toolbars", &self.toolbars.ids())
            .field("plugins", &self.plugins)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl<H: EditingHost> EditorContext<H> {
    /// Context with default settings and an empty `en` catalog.
    pub fn new(host: H) -> Self {
        Self {
            host,
            settings: Settings::default(),
            translator: Box::new(Catalog::new()),
            bus: EventBus::new(),
            editors: EditorRegistry::default(),
            toolbars: ToolbarRegistry::default(),
            plugins: PluginRegistry::default(),
            next_id: 0,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    /// Translate a message with the context's translator.
    pub fn trans(&self, message: &str) -> String {
        self.translator.translate(message)
    }

    pub fn editors(&self) -> &EditorRegistry<H> {
        &self.editors
    }

    pub fn toolbars(&self) -> &ToolbarRegistry<H> {
        &self.toolbars
    }

    pub fn toolbar(&self, id: &str) -> Option<&Toolbar<H>> {
        self.toolbars.get(id)
    }

    pub fn editor(&self, id: &str) -> Option<&Editor<H>> {
        self.editors.get(id)
    }

    /// Next synthetic id (`"1"`, `"2"`, ...), shared by editors, toolbars and
    /// item keys.
    pub fn next_id(&mut self) -> SmolStr {
        self.next_id += 1;
        SmolStr::new(self.next_id.to_string())
    }

    /// Run `f` with an editor and the host.
    pub fn with_editor<R>(&mut self, id: &str, f: impl FnOnce(&mut Editor<H>, &H) -> R) -> Option<R> {
        let editor = self.editors.get_mut(id)?;
        Some(f(editor, &self.host))
    }

    /// Run `f` with a toolbar and the host.
    pub fn with_toolbar<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut Toolbar<H>, &H) -> R,
    ) -> Option<R> {
        let toolbar = self.toolbars.get_mut(id)?;
        Some(f(toolbar, &self.host))
    }

    // === Events ===

    /// Add a global listener.
    pub fn listen(
        &mut self,
        kind: EventKind,
        listener: impl Fn(&mut EditorContext<H>, &mut EditorEvent<H>) + 'static,
    ) -> ListenerId {
        self.bus.listen(kind, listener)
    }

    /// Add a listener to one editor's private bus.
    pub fn listen_editor(
        &mut self,
        editor: &str,
        kind: EventKind,
        listener: impl Fn(&mut EditorContext<H>, &mut EditorEvent<H>) + 'static,
    ) -> Option<ListenerId> {
        Some(self.editors.get_mut(editor)?.bus_mut().listen(kind, listener))
    }

    /// Remove a global listener.
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.bus.unlisten(id)
    }

    /// Fire an event on the global bus and return it after every listener
    /// had the chance to modify it.
    pub fn fire(&mut self, mut event: EditorEvent<H>) -> EditorEvent<H> {
        let kind = event.kind();
        let listeners = self.bus.listeners_for(kind);
        tracing::trace!(target: "quire::event", event = %kind, listeners = listeners.len(), "fire");
        for listener in listeners {
            listener(self, &mut event);
        }
        event
    }

    /// Fire on the global bus, then on `editor`'s private bus.
    pub fn fire_editor(&mut self, editor: &str, event: EditorEvent<H>) -> EditorEvent<H> {
        let mut event = self.fire(event);
        let kind = event.kind();
        let local = self
            .editors
            .get(editor)
            .map(|e| e.bus().listeners_for(kind))
            .unwrap_or_default();
        for listener in local {
            listener(self, &mut event);
        }
        event
    }

    // === Plugins ===

    /// Register a plugin: run its init once, then add its listeners to the
    /// global bus. A plugin with the same name is replaced.
    pub fn plugin(&mut self, mut plugin: Plugin<H>) {
        let name = SmolStr::new(plugin.name());
        if let Some(previous) = self.plugins.remove(&name) {
            tracing::warn!(target: "quire::plugin", plugin = %name, "replacing plugin registered under the same name");
            for id in previous {
                self.bus.unlisten(id);
            }
        }

        if let Some(init) = plugin.init.take() {
            init(self);
        }

        let ids = plugin
            .listeners
            .drain(..)
            .map(|(kind, listener)| self.bus.listen_rc(kind, listener))
            .collect();
        tracing::debug!(target: "quire::plugin", plugin = %name, "registered plugin");
        self.plugins.insert(name, ids);
    }

    /// Register plugins in order.
    pub fn plugins(&mut self, plugins: impl IntoIterator<Item = Plugin<H>>) {
        for plugin in plugins {
            self.plugin(plugin);
        }
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.has(name)
    }

    pub fn plugin_names(&self) -> Vec<SmolStr> {
        self.plugins.names()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::EditorConfig;
    use crate::interaction::{Interaction, InteractionKind};
    use crate::memory::MemoryHost;
    use crate::types::EditorId;

    #[test]
    fn test_plugin_init_runs_once_and_listeners_merge() {
        let mut ctx = EditorContext::new(MemoryHost::new());
        let inits = Rc::new(RefCell::new(0));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let i = inits.clone();
        let s = seen.clone();
        ctx.plugin(
            Plugin::new("counter")
                .with_init(move |_| *i.borrow_mut() += 1)
                .on(EventKind::EditorsInit, move |_, _| s.borrow_mut().push("init")),
        );
        ctx.init();
        ctx.init();
        assert_eq!(*inits.borrow(), 1);
        assert_eq!(*seen.borrow(), vec!["init", "init"]);
        assert!(ctx.has_plugin("counter"));
    }

    #[test]
    fn test_duplicate_plugin_name_replaces_listeners() {
        let mut ctx = EditorContext::new(MemoryHost::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        ctx.plugin(Plugin::new("dup").on(EventKind::EditorsInit, move |_, _| s.borrow_mut().push("first")));
        let s = seen.clone();
        ctx.plugin(Plugin::new("dup").on(EventKind::EditorsInit, move |_, _| s.borrow_mut().push("second")));

        ctx.init();
        assert_eq!(*seen.borrow(), vec!["second"]);
        assert_eq!(ctx.plugin_names(), vec![SmolStr::new("dup")]);
    }

    #[test]
    fn test_global_listeners_run_before_local() {
        let mut ctx = EditorContext::new(MemoryHost::new());
        let root = ctx.host().mount("<p>x</p>");
        let id = ctx.create_editor(root, EditorConfig::default().with_id("e")).unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        let o = order.clone();
        ctx.listen_editor(&id, EventKind::Editor(InteractionKind::KeyUp), move |_, _| {
            o.borrow_mut().push("local")
        })
        .unwrap();
        let o = order.clone();
        ctx.listen(EventKind::Editor(InteractionKind::KeyUp), move |_, _| {
            o.borrow_mut().push("global")
        });

        ctx.handle_interaction(&id, Interaction::new(InteractionKind::KeyUp));
        assert_eq!(*order.borrow(), vec!["global", "local"]);
    }

    #[test]
    fn test_listener_can_mutate_context() {
        let mut ctx = EditorContext::new(MemoryHost::new());
        ctx.listen(EventKind::EditorCreated, |ctx, event| {
            if let Some(editor) = event.editor().cloned() {
                ctx.set_active_editor(&editor);
            }
        });
        let root = ctx.host().mount("");
        let id = ctx.create_editor(root, EditorConfig::default()).unwrap();
        assert_eq!(ctx.editors().active_id(), Some(&EditorId::new("1")));
        assert_eq!(id, "1");
    }

    #[test]
    fn test_unlisten() {
        let mut ctx = EditorContext::new(MemoryHost::new());
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        let id = ctx.listen(EventKind::EditorsRegistered, move |_, _| *h.borrow_mut() += 1);
        ctx.register();
        assert!(ctx.unlisten(id));
        ctx.register();
        assert_eq!(*hits.borrow(), 1);
    }
}
