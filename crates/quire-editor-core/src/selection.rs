//! Per-editor selection tracking.
//!
//! Toolbar interaction moves focus away from the editable surface, which
//! drops the host selection. [`SelectionManager::save`] keeps a durable
//! snapshot, optionally wrapping the selected text in a marker element so a
//! later command can find the exact range again.

use smol_str::SmolStr;

use crate::error::HostError;
use crate::host::{EditingHost, ElementSpec};

/// Value of the marker attribute.
pub const MARKER_VALUE: &str = "editor";

/// Attribute identifying an editor surface.
pub const EDITOR_ID_ATTRIBUTE: &str = "data-editor-id";

/// Selected text and the element it lives in.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot<N> {
    pub text: String,
    pub element: Option<N>,
    /// Lower-cased tag name of `element`, empty without one.
    pub tag_name: SmolStr,
}

impl<N> Default for SelectionSnapshot<N> {
    fn default() -> Self {
        Self {
            text: String::new(),
            element: None,
            tag_name: SmolStr::default(),
        }
    }
}

impl<N> SelectionSnapshot<N> {
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Handle to a marker element returned by the host's wrap operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor<N> {
    node: N,
}

impl<N> Anchor<N> {
    pub fn node(&self) -> &N {
        &self.node
    }
}

/// Selection state of one editor.
pub struct SelectionManager<H: EditingHost> {
    root: H::Node,
    marker_attribute: SmolStr,
    saved: SelectionSnapshot<H::Node>,
    anchor: Option<Anchor<H::Node>>,
}

impl<H: EditingHost> std::fmt::Debug for SelectionManager<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionManager")
            .field("root", &self.root)
            .field("saved", &self.saved)
            .field("anchor", &self.anchor)
            .finish()
    }
}

impl<H: EditingHost> SelectionManager<H> {
    pub fn new(root: H::Node, marker_attribute: impl Into<SmolStr>) -> Self {
        Self {
            root,
            marker_attribute: marker_attribute.into(),
            saved: SelectionSnapshot::default(),
            anchor: None,
        }
    }

    pub fn root(&self) -> &H::Node {
        &self.root
    }

    /// Live snapshot of the host selection.
    pub fn current(&self, host: &H) -> SelectionSnapshot<H::Node> {
        match host.selection() {
            Some(sel) => SelectionSnapshot {
                tag_name: host.tag_name(&sel.container),
                text: sel.text,
                element: Some(sel.container),
            },
            None => SelectionSnapshot::default(),
        }
    }

    /// Tag names from the selection's element up to the editor root, outermost
    /// first. The root itself is not included.
    pub fn enclosing_tag_names(&self, host: &H) -> Vec<SmolStr> {
        let mut names = Vec::new();
        let mut current = self.current(host).element;
        while let Some(node) = current {
            if node == self.root {
                break;
            }
            names.push(host.tag_name(&node));
            current = host.parent(&node);
        }
        names.reverse();
        names
    }

    /// Store the live selection. With `marker`, the selected text is wrapped
    /// in a marker element which becomes the saved element.
    pub fn save(&mut self, host: &H, marker: bool) {
        if !marker {
            self.saved = self.current(host);
            return;
        }

        self.clear(host);
        let current = self.current(host);
        let spec = ElementSpec::new("span").with_attribute(self.marker_attribute.clone(), MARKER_VALUE);
        match host.wrap_selection(&spec) {
            Ok(node) => {
                tracing::trace!(target: "quire::selection", text = %current.text, "saved selection with marker");
                self.anchor = Some(Anchor { node: node.clone() });
                self.saved = SelectionSnapshot {
                    text: current.text,
                    element: Some(node),
                    tag_name: SmolStr::new_static("span"),
                };
            }
            Err(e) => {
                tracing::debug!(target: "quire::selection", error = %e, "could not place selection marker");
                self.anchor = None;
                self.saved = SelectionSnapshot {
                    text: current.text,
                    element: None,
                    tag_name: SmolStr::default(),
                };
            }
        }
    }

    pub fn saved(&self) -> &SelectionSnapshot<H::Node> {
        &self.saved
    }

    pub fn set_saved(&mut self, host: &H, element: H::Node, text: impl Into<String>) {
        self.saved = SelectionSnapshot {
            text: text.into(),
            tag_name: host.tag_name(&element),
            element: Some(element),
        };
    }

    /// The marker element inside this editor, if one is placed.
    pub fn marker(&self, host: &H) -> Option<H::Node> {
        if let Some(anchor) = &self.anchor
            && host.attribute(&anchor.node, &self.marker_attribute).is_some()
            && host.contains(&self.root, &anchor.node)
        {
            return Some(anchor.node.clone());
        }
        host.find_with_attribute(Some(&self.root), &self.marker_attribute)
            .into_iter()
            .next()
    }

    /// Remove the marker, keeping its content in place.
    ///
    /// A marker without other attributes is unwrapped; one that picked up
    /// attributes in the meantime only loses the marker attribute.
    pub fn clear(&mut self, host: &H) {
        let Some(marker) = self.marker(host) else {
            self.anchor = None;
            return;
        };
        if host.attribute_count(&marker) <= 1 {
            if let Err(e) = host.unwrap_node(&marker) {
                tracing::warn!(target: "quire::selection", error = %e, "failed to unwrap marker");
            }
            if self.saved.element.as_ref() == Some(&marker) {
                self.saved = SelectionSnapshot::default();
            }
        } else {
            host.remove_attribute(&marker, &self.marker_attribute);
        }
        self.anchor = None;
    }

    /// Replace the marker with `node`. Returns whether a marker was found.
    pub fn replace(&mut self, host: &H, node: &H::Node) -> bool {
        let Some(marker) = self.marker(host) else {
            return false;
        };
        match host.replace_node(&marker, node) {
            Ok(()) => {
                if self.saved.element.as_ref() == Some(&marker) {
                    self.saved.element = Some(node.clone());
                    self.saved.tag_name = host.tag_name(node);
                }
                self.anchor = None;
                true
            }
            Err(e) => {
                tracing::warn!(target: "quire::selection", error = %e, "failed to replace marker");
                false
            }
        }
    }

    /// Replace the snapshot's element with `node`. Refused for the editor root.
    pub fn insert_replace(
        &self,
        host: &H,
        snapshot: &SelectionSnapshot<H::Node>,
        node: &H::Node,
    ) -> Result<(), HostError> {
        let target = self.editable_target(host, snapshot)?;
        host.replace_node(&target, node)
    }

    /// Insert `node` after the snapshot's element. Refused for the editor root.
    pub fn insert_after(
        &self,
        host: &H,
        snapshot: &SelectionSnapshot<H::Node>,
        node: &H::Node,
    ) -> Result<(), HostError> {
        let target = self.editable_target(host, snapshot)?;
        host.insert_after(&target, node)
    }

    fn editable_target(
        &self,
        host: &H,
        snapshot: &SelectionSnapshot<H::Node>,
    ) -> Result<H::Node, HostError> {
        let target = snapshot.element.clone().ok_or(HostError::NoSelection)?;
        if target == self.root || host.attribute(&target, EDITOR_ID_ATTRIBUTE).is_some() {
            return Err(HostError::Unsupported("editor root"));
        }
        Ok(target)
    }
}
