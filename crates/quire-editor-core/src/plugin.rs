//! Feature plugins.
//!
//! A plugin is a named bundle of an init callback and global listeners.
//! Most plugins only listen to `editors.init` to register their toolbar
//! templates and create their sub-toolbars.

use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::context::EditorContext;
use crate::event::{EditorEvent, EventKind, Listener, ListenerId};
use crate::host::EditingHost;

/// Callback run once when the plugin is registered.
pub type PluginInit<H> = Box<dyn FnOnce(&mut EditorContext<H>)>;

pub struct Plugin<H: EditingHost> {
    name: SmolStr,
    pub(crate) init: Option<PluginInit<H>>,
    pub(crate) listeners: Vec<(EventKind, Listener<H>)>,
}

impl<H: EditingHost> fmt::Debug for Plugin<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("init", &self.init.is_some())
            .field(
                "listeners",
                &self.listeners.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<H: EditingHost> Plugin<H> {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            init: None,
            listeners: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_init(mut self, init: impl FnOnce(&mut EditorContext<H>) + 'static) -> Self {
        self.init = Some(Box::new(init));
        self
    }

    /// Add a global listener.
    pub fn on(
        mut self,
        kind: EventKind,
        listener: impl Fn(&mut EditorContext<H>, &mut EditorEvent<H>) + 'static,
    ) -> Self {
        self.listeners.push((kind, Rc::new(listener)));
        self
    }
}

/// Registered plugin names and the global listeners each contributed.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<(SmolStr, Vec<ListenerId>)>,
}

impl PluginRegistry {
    pub fn has(&self, name: &str) -> bool {
        self.plugins.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> Vec<SmolStr> {
        self.plugins.iter().map(|(n, _)| n.clone()).collect()
    }

    pub(crate) fn insert(&mut self, name: SmolStr, listeners: Vec<ListenerId>) {
        self.plugins.push((name, listeners));
    }

    /// Forget `name`, returning the listeners it had registered.
    pub(crate) fn remove(&mut self, name: &str) -> Option<Vec<ListenerId>> {
        let index = self.plugins.iter().position(|(n, _)| n == name)?;
        Some(self.plugins.remove(index).1)
    }
}
