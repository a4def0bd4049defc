//! Floating toolbars.
//!
//! A [`Toolbar`] owns its surface element and an ordered item list. State
//! changes that only touch the toolbar itself live here; anything that fires
//! events or consults other registries (open/close, build, command
//! execution, positioning) is on [`EditorContext`](crate::EditorContext).

mod item;
mod position;
mod registry;

pub use item::{
    Command, ElementKind, ItemHandler, ItemParams, ItemTrigger, MatchField, Placement,
    ToolbarItem, Undo,
};
pub use position::{LastPosition, PositionRequest, compute_position};
pub use registry::ToolbarRegistry;

use std::fmt;

use smol_str::SmolStr;

use crate::error::HostError;
use crate::host::{EditingHost, ElementSpec, Point, Size};
use crate::types::ToolbarId;

/// Class present on open toolbars.
pub const OPEN_CLASS: &str = "etb-active";

/// One floating control surface.
pub struct Toolbar<H: EditingHost> {
    id: ToolbarId,
    el: H::Node,
    pub(crate) is_open: bool,
    keep_open: bool,
    size: Option<Size>,
    pub(crate) position: Point,
    pub(crate) items: Vec<ToolbarItem<H>>,
}

impl<H: EditingHost> fmt::Debug for Toolbar<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolbar")
            .field("id", &self.id)
            .field("el", &self.el)
            .field("is_open", &self.is_open)
            .field("keep_open", &self.keep_open)
            .field("position", &self.position)
            .field("items", &self.keys())
            .finish()
    }
}

impl<H: EditingHost> Toolbar<H> {
    /// Create the surface element and attach it to the document body.
    pub fn new(host: &H, id: ToolbarId) -> Result<Self, HostError> {
        let el = host.create_element(
            &ElementSpec::new("div")
                .with_class("editor-toolbar")
                .with_attribute("data-editor-toolbar-id", id.as_str())
                .with_attribute("data-editor-type", "toolbar"),
        )?;
        let body = host.body().ok_or(HostError::Detached)?;
        host.append_child(&body, &el)?;
        Ok(Self {
            id,
            el,
            is_open: false,
            keep_open: false,
            size: None,
            position: Point::default(),
            items: Vec::new(),
        })
    }

    pub fn id(&self) -> &ToolbarId {
        &self.id
    }

    pub fn element(&self) -> &H::Node {
        &self.el
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Exempt the toolbar from close sweeps while writing.
    pub fn keep_open(&mut self, keep_open: bool) {
        self.keep_open = keep_open;
    }

    pub fn is_kept_open(&self) -> bool {
        self.keep_open
    }

    /// Top-left corner of the last positioning.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&ToolbarItem<H>> {
        self.items.iter().find(|i| i.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ToolbarItem<H>> {
        self.items.iter_mut().find(|i| i.key == key)
    }

    pub fn items(&self) -> &[ToolbarItem<H>] {
        &self.items
    }

    pub fn keys(&self) -> Vec<SmolStr> {
        self.items.iter().map(|i| i.key.clone()).collect()
    }

    /// Bound element of the item with `key`.
    pub fn item_element(&self, key: &str) -> Option<H::Node> {
        self.get(key).and_then(|i| i.el.clone())
    }

    /// Mark the items whose `field` is in `values` active. With `exclusive`,
    /// every other item is marked inactive.
    pub fn set_active(&mut self, host: &H, values: &[SmolStr], field: MatchField, exclusive: bool) {
        for item in &mut self.items {
            if item.matches(field, values) {
                mark_active(host, item, true);
            } else if exclusive {
                mark_active(host, item, false);
            }
        }
    }

    pub fn set_active_item(&mut self, host: &H, key: &str) {
        if let Some(item) = self.get_mut(key) {
            mark_active(host, item, true);
        }
    }

    pub fn disable(&mut self, host: &H, key: &str, hide: bool) {
        if let Some(item) = self.get_mut(key) {
            item.disabled = true;
            if let Some(el) = &item.el {
                host.set_attribute(el, "disabled", "true");
                if hide {
                    host.set_hidden(el, true);
                }
            }
        }
    }

    pub fn enable(&mut self, host: &H, key: &str) {
        if let Some(item) = self.get_mut(key) {
            item.disabled = false;
            if let Some(el) = &item.el {
                host.set_hidden(el, false);
                host.remove_attribute(el, "disabled");
            }
        }
    }

    /// Disable and hide every item not in `keys`.
    pub fn disable_except(&mut self, host: &H, keys: &[&str]) {
        for key in self.keys() {
            if !keys.contains(&key.as_str()) {
                self.disable(host, &key, true);
            }
        }
    }

    pub fn enable_except(&mut self, host: &H, keys: &[&str]) {
        for key in self.keys() {
            if !keys.contains(&key.as_str()) {
                self.enable(host, &key);
            }
        }
    }

    /// Size of the surface, measured on first use.
    pub fn measured_size(&mut self, host: &H) -> Size {
        *self.size.get_or_insert_with(|| host.element_size(&self.el))
    }

    /// Forget the cached size, e.g. after items were added.
    pub fn invalidate_size(&mut self) {
        self.size = None;
    }
}

fn mark_active<H: EditingHost>(host: &H, item: &mut ToolbarItem<H>, active: bool) {
    item.active = active;
    if let Some(el) = &item.el {
        if active {
            host.add_class(el, "active");
        } else {
            host.remove_class(el, "active");
        }
        host.set_attribute(el, "data-active", if active { "true" } else { "false" });
    }
}
