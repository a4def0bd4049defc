use smol_str::SmolStr;

use super::{LastPosition, Toolbar, ToolbarItem};
use crate::host::EditingHost;
use crate::types::ToolbarId;

/// Toolbars in creation order plus the shared item templates.
pub struct ToolbarRegistry<H: EditingHost> {
    toolbars: Vec<Toolbar<H>>,
    templates: Vec<ToolbarItem<H>>,
    pub(crate) open_id: Option<ToolbarId>,
    pub(crate) last_id: Option<ToolbarId>,
    pub(crate) last: Option<LastPosition>,
}

impl<H: EditingHost> Default for ToolbarRegistry<H> {
    fn default() -> Self {
        Self {
            toolbars: Vec::new(),
            templates: Vec::new(),
            open_id: None,
            last_id: None,
            last: None,
        }
    }
}

impl<H: EditingHost> ToolbarRegistry<H> {
    pub fn get(&self, id: &str) -> Option<&Toolbar<H>> {
        self.toolbars.iter().find(|t| t.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Toolbar<H>> {
        self.toolbars.iter_mut().find(|t| t.id() == id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<ToolbarId> {
        self.toolbars.iter().map(|t| t.id().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toolbar<H>> {
        self.toolbars.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Toolbar<H>> {
        self.toolbars.iter_mut()
    }

    pub(crate) fn insert(&mut self, toolbar: Toolbar<H>) {
        self.toolbars.push(toolbar);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Toolbar<H>> {
        let index = self.toolbars.iter().position(|t| t.id() == id)?;
        if self.open_id.as_ref().is_some_and(|o| o == id) {
            self.open_id = None;
        }
        if self.last_id.as_ref().is_some_and(|l| l == id) {
            self.last_id = None;
        }
        Some(self.toolbars.remove(index))
    }

    /// Id of the open toolbar.
    pub fn open_id(&self) -> Option<&ToolbarId> {
        self.open_id.as_ref()
    }

    /// Id of the last toolbar that was open.
    pub fn last_id(&self) -> Option<&ToolbarId> {
        self.last_id.as_ref()
    }

    pub fn last_position(&self) -> Option<LastPosition> {
        self.last
    }

    pub fn template(&self, key: &str) -> Option<&ToolbarItem<H>> {
        self.templates.iter().find(|t| t.key == key)
    }

    pub fn templates(&self) -> &[ToolbarItem<H>] {
        &self.templates
    }

    /// Store a template, replacing one with the same key in place.
    pub(crate) fn store_template(&mut self, item: ToolbarItem<H>) {
        match self.templates.iter_mut().find(|t| t.key == item.key) {
            Some(existing) => *existing = item,
            None => self.templates.push(item),
        }
    }

    /// Keys of the templates a build without a key list uses.
    pub fn default_keys(&self) -> Vec<SmolStr> {
        self.templates
            .iter()
            .filter(|t| t.is_default_build())
            .map(|t| t.key.clone())
            .collect()
    }
}
