//! Host editing environment abstraction.
//!
//! The editor core never touches a document directly. Everything it needs
//! from its environment (selection queries, command execution, structural
//! mutation, geometry) goes through [`EditingHost`]. The browser crate
//! implements it over `web-sys`; [`MemoryHost`](crate::memory::MemoryHost)
//! implements it over an in-memory tree for native embedding and tests.

use std::fmt;

use smol_str::SmolStr;

use crate::error::HostError;

/// A point in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Measured element size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Bounding rectangle of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// The host's current selection range.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSelection<N> {
    /// Selected text (empty for a caret).
    pub text: String,
    /// Nearest element containing the range's common ancestor.
    pub container: N,
    /// Whether the range is a caret.
    pub collapsed: bool,
}

/// Declarative description of an element to construct.
///
/// Mirrors what toolbar items and plugins need: a tag, optional inner HTML,
/// the handful of form attributes controls use, classes, free attributes,
/// and `<option>` children for selects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementSpec {
    pub tag: SmolStr,
    /// Inner HTML (labels and icons are markup).
    pub html: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub input_type: Option<String>,
    pub placeholder: Option<String>,
    pub label_for: Option<String>,
    pub classes: Vec<SmolStr>,
    pub attributes: Vec<(SmolStr, String)>,
    /// `(label, value)` pairs rendered as `<option>` children.
    pub options: Vec<(String, String)>,
    /// Give each option a class equal to its value.
    pub option_to_class: bool,
}

impl ElementSpec {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<SmolStr>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// All attributes the element starts with, in application order.
    pub fn all_attributes(&self) -> Vec<(SmolStr, String)> {
        let mut attrs = Vec::new();
        if let Some(t) = &self.input_type {
            attrs.push((SmolStr::new_static("type"), t.clone()));
        }
        if let Some(id) = &self.id {
            attrs.push((SmolStr::new_static("id"), id.clone()));
        }
        if let Some(name) = &self.name {
            attrs.push((SmolStr::new_static("name"), name.clone()));
        }
        if let Some(target) = &self.label_for {
            attrs.push((SmolStr::new_static("for"), target.clone()));
        }
        if let Some(placeholder) = &self.placeholder {
            attrs.push((SmolStr::new_static("placeholder"), placeholder.clone()));
        }
        if !self.classes.is_empty() {
            attrs.push((SmolStr::new_static("class"), self.classes.join(" ")));
        }
        attrs.extend(self.attributes.iter().cloned());
        attrs
    }
}

/// Capabilities the editor core consumes from its environment.
///
/// Queries return `Option`/empty values when there is nothing to report.
/// Structural mutations return `Result` so the core can log and skip a
/// failed edit; attribute and class updates are fire-and-forget.
pub trait EditingHost: 'static {
    /// Element handle. Text nodes never cross this boundary.
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    // === Selection ===

    /// The current selection range, if any.
    fn selection(&self) -> Option<HostSelection<Self::Node>>;

    /// Bounding rectangle of the first client rect of the selection.
    ///
    /// `None` when there is no range or it has no geometry (e.g. a caret in
    /// an empty line).
    fn selection_rect(&self) -> Option<Rect>;

    /// Element whose whole content is exactly the selected range, or the
    /// caret's container for a collapsed selection.
    fn enclosed_element(&self) -> Option<Self::Node>;

    /// Collapse the selection to `offset` children into `node`.
    fn collapse_selection(&self, node: &Self::Node, offset: u32);

    /// Wrap the selected text in a new element and return it.
    ///
    /// The wrapper is the anchor the selection manager uses to find the
    /// selection again after the toolbar steals focus.
    fn wrap_selection(&self, wrapper: &ElementSpec) -> Result<Self::Node, HostError>;

    /// Execute a named formatting command against the focused surface.
    fn exec_command(&self, command: &str, value: Option<&str>) -> Result<(), HostError>;

    fn focus(&self, node: &Self::Node);

    // === Tree ===

    fn body(&self) -> Option<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Element children in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Lower-cased tag name.
    fn tag_name(&self, node: &Self::Node) -> SmolStr;

    fn create_element(&self, spec: &ElementSpec) -> Result<Self::Node, HostError>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Insert `node` directly before `reference` in its parent.
    fn insert_before(&self, reference: &Self::Node, node: &Self::Node) -> Result<(), HostError>;

    /// Insert `node` directly after `reference` in its parent.
    fn insert_after(&self, reference: &Self::Node, node: &Self::Node) -> Result<(), HostError>;

    fn replace_node(&self, old: &Self::Node, new: &Self::Node) -> Result<(), HostError>;

    fn remove_node(&self, node: &Self::Node) -> Result<(), HostError>;

    /// Replace `node` with its own children.
    fn unwrap_node(&self, node: &Self::Node) -> Result<(), HostError>;

    /// Descendants of `root` (or of the whole document) carrying `attribute`.
    fn find_with_attribute(&self, root: Option<&Self::Node>, attribute: &str) -> Vec<Self::Node>;

    // === Attributes and content ===

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    fn remove_attribute(&self, node: &Self::Node, name: &str);

    fn attribute_count(&self, node: &Self::Node) -> usize;

    fn add_class(&self, node: &Self::Node, class: &str);

    fn remove_class(&self, node: &Self::Node, class: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn inner_html(&self, node: &Self::Node) -> String;

    fn set_inner_html(&self, node: &Self::Node, html: &str);

    fn text_content(&self, node: &Self::Node) -> String;

    fn set_text_content(&self, node: &Self::Node, text: &str);

    fn set_content_editable(&self, node: &Self::Node, editable: bool);

    /// Toggle `display: none`.
    fn set_hidden(&self, node: &Self::Node, hidden: bool);

    /// Current value of a form control.
    fn value(&self, node: &Self::Node) -> Option<String>;

    fn set_value(&self, node: &Self::Node, value: &str);

    fn checked(&self, node: &Self::Node) -> bool;

    fn set_checked(&self, node: &Self::Node, checked: bool);

    // === Geometry ===

    /// Rendered size of the element (zero while hidden).
    fn element_size(&self, node: &Self::Node) -> Size;

    fn viewport_width(&self) -> f64;

    /// Place an absolutely positioned element at page coordinates.
    fn place(&self, node: &Self::Node, at: Point);

    /// Open a URL in a new browsing context.
    fn open_url(&self, url: &str) {
        tracing::debug!(target: "quire::host", url, "open_url not supported by host");
    }

    // === Provided ===

    /// Nearest inclusive ancestor with the given tag.
    fn closest(&self, node: &Self::Node, tag: &str) -> Option<Self::Node> {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if self.tag_name(&n) == tag {
                return Some(n);
            }
            current = self.parent(&n);
        }
        None
    }

    /// Nearest inclusive ancestor carrying `attribute`.
    fn closest_with_attribute(&self, node: &Self::Node, attribute: &str) -> Option<Self::Node> {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if self.attribute(&n, attribute).is_some() {
                return Some(n);
            }
            current = self.parent(&n);
        }
        None
    }

    /// Whether `ancestor` is `node` or contains it.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if &n == ancestor {
                return true;
            }
            current = self.parent(&n);
        }
        false
    }

    /// Descendants of `root` with the given tag, in document order.
    fn descendants_with_tag(&self, root: &Self::Node, tag: &str) -> Vec<Self::Node> {
        let mut found = Vec::new();
        let mut stack: Vec<Self::Node> = self.children(root).into_iter().rev().collect();
        while let Some(n) = stack.pop() {
            if self.tag_name(&n) == tag {
                found.push(n.clone());
            }
            stack.extend(self.children(&n).into_iter().rev());
        }
        found
    }

    /// Position of `node` among its parent's element children.
    fn element_index(&self, node: &Self::Node) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(&parent).iter().position(|c| c == node)
    }
}
