//! In-memory document host.
//!
//! `MemoryHost` implements [`EditingHost`] over an arena-backed element tree
//! with a single selection range. It backs headless embedding and every test
//! in this crate. Formatting commands are logged and the common ones
//! (inline toggles, `formatblock`, `insertHTML`, `insertText`) are applied
//! to the tree the way a browser would for a selection inside one text node.

use std::cell::{Cell, RefCell};

use smol_str::SmolStr;

use crate::error::HostError;
use crate::host::{EditingHost, ElementSpec, HostSelection, Point, Rect, Size};

use crate::html::{Fragment, is_void, parse_fragment, write_attribute, write_text};

/// Handle to an element in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: SmolStr,
    attributes: Vec<(SmolStr, String)>,
    value: Option<String>,
    checked: bool,
    hidden: bool,
    editable: bool,
    size: Size,
    position: Option<Point>,
}

#[derive(Debug, Clone)]
struct MemNode {
    data: NodeData,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// A selection boundary. For text nodes `offset` counts chars, for elements
/// it counts children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Boundary {
    node: usize,
    offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MemRange {
    start: Boundary,
    end: Boundary,
}

/// A command passed to [`EditingHost::exec_command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCommand {
    pub name: String,
    pub value: Option<String>,
}

const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "div", "li",
];

#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<MemNode>,
}

impl Tree {
    fn push(&mut self, data: NodeData) -> usize {
        self.nodes.push(MemNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn element(&mut self, tag: &str, attributes: Vec<(SmolStr, String)>) -> usize {
        self.push(NodeData::Element(ElementData {
            tag: SmolStr::new(tag.to_ascii_lowercase()),
            attributes,
            ..Default::default()
        }))
    }

    fn text(&mut self, text: &str) -> usize {
        self.push(NodeData::Text(text.to_string()))
    }

    fn el(&self, n: usize) -> Option<&ElementData> {
        match &self.nodes.get(n)?.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    fn el_mut(&mut self, n: usize) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(n)?.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    fn text_of(&self, n: usize) -> Option<&str> {
        match &self.nodes.get(n)?.data {
            NodeData::Text(t) => Some(t),
            NodeData::Element(_) => None,
        }
    }

    fn is_text(&self, n: usize) -> bool {
        self.text_of(n).is_some()
    }

    fn detach(&mut self, n: usize) {
        if let Some(parent) = self.nodes[n].parent.take() {
            self.nodes[parent].children.retain(|c| *c != n);
        }
    }

    fn is_inclusive_descendant(&self, mut n: usize, ancestor: usize) -> bool {
        loop {
            if n == ancestor {
                return true;
            }
            match self.nodes[n].parent {
                Some(parent) => n = parent,
                None => return false,
            }
        }
    }

    /// Refuse to move `child` under `parent` when that would create a cycle.
    fn check_insert(&self, parent: usize, child: usize) -> Result<(), HostError> {
        if self.is_inclusive_descendant(parent, child) {
            return Err(HostError::Unsupported("node cannot be inserted into itself or a descendant"));
        }
        Ok(())
    }

    fn insert_at(&mut self, parent: usize, index: usize, child: usize) {
        self.detach(child);
        let len = self.nodes[parent].children.len();
        self.nodes[parent].children.insert(index.min(len), child);
        self.nodes[child].parent = Some(parent);
    }

    fn append(&mut self, parent: usize, child: usize) {
        let len = self.nodes[parent].children.len();
        self.insert_at(parent, len, child);
    }

    fn index_in_parent(&self, n: usize) -> Option<(usize, usize)> {
        let parent = self.nodes[n].parent?;
        let index = self.nodes[parent].children.iter().position(|c| *c == n)?;
        Some((parent, index))
    }

    fn root_of(&self, mut n: usize) -> usize {
        while let Some(parent) = self.nodes[n].parent {
            n = parent;
        }
        n
    }

    fn text_len(&self, n: usize) -> usize {
        match &self.nodes[n].data {
            NodeData::Text(t) => t.chars().count(),
            NodeData::Element(_) => self.nodes[n]
                .children
                .iter()
                .map(|c| self.text_len(*c))
                .sum(),
        }
    }

    fn text_content(&self, n: usize, out: &mut String) {
        match &self.nodes[n].data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element(_) => {
                for c in &self.nodes[n].children {
                    self.text_content(*c, out);
                }
            }
        }
    }

    fn text_nodes_under(&self, n: usize, out: &mut Vec<usize>) {
        for c in &self.nodes[n].children {
            if self.is_text(*c) {
                out.push(*c);
            } else {
                self.text_nodes_under(*c, out);
            }
        }
    }

    /// Chars of text preceding `b` within its root.
    fn global_offset(&self, b: Boundary) -> usize {
        let local = if self.is_text(b.node) {
            b.offset
        } else {
            self.nodes[b.node]
                .children
                .iter()
                .take(b.offset)
                .map(|c| self.text_len(*c))
                .sum()
        };
        let mut total = local;
        let mut current = b.node;
        while let Some(parent) = self.nodes[current].parent {
            for sibling in &self.nodes[parent].children {
                if *sibling == current {
                    break;
                }
                total += self.text_len(*sibling);
            }
            current = parent;
        }
        total
    }

    fn ancestors_inclusive(&self, mut n: usize) -> Vec<usize> {
        let mut chain = vec![n];
        while let Some(parent) = self.nodes[n].parent {
            chain.push(parent);
            n = parent;
        }
        chain
    }

    fn common_ancestor(&self, a: usize, b: usize) -> usize {
        let chain = self.ancestors_inclusive(a);
        let mut current = b;
        loop {
            if chain.contains(&current) {
                return current;
            }
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => return chain.last().copied().unwrap_or(a),
            }
        }
    }

    fn serialize_children(&self, n: usize, out: &mut String) {
        for c in &self.nodes[n].children {
            self.serialize(*c, out);
        }
    }

    fn serialize(&self, n: usize, out: &mut String) {
        match &self.nodes[n].data {
            NodeData::Text(t) => write_text(out, t),
            NodeData::Element(e) => {
                out.push('<');
                out.push_str(&e.tag);
                for (name, value) in &e.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    write_attribute(out, value);
                    out.push('"');
                }
                out.push('>');
                if is_void(&e.tag) {
                    return;
                }
                self.serialize_children(n, out);
                out.push_str("</");
                out.push_str(&e.tag);
                out.push('>');
            }
        }
    }

    fn build(&mut self, fragment: &Fragment) -> usize {
        match fragment {
            Fragment::Text(t) => self.text(t),
            Fragment::Element {
                tag,
                attributes,
                children,
            } => {
                let n = self.element(tag, attributes.clone());
                for child in children {
                    let c = self.build(child);
                    self.append(n, c);
                }
                n
            }
        }
    }

    fn clear_children(&mut self, n: usize) {
        for c in std::mem::take(&mut self.nodes[n].children) {
            self.nodes[c].parent = None;
        }
    }

    /// Split the text node in `range` into before/selected/after and return
    /// `(parent, index of the selected part, selected text)`.
    fn split_single_text(&mut self, range: MemRange) -> Result<(usize, usize, String), HostError> {
        if range.start.node != range.end.node {
            return Err(HostError::Unsupported("selection spans multiple nodes"));
        }
        let node = range.start.node;
        let Some(text) = self.text_of(node).map(|t| t.to_string()) else {
            let parent = node;
            return if range.start.offset == range.end.offset {
                Ok((parent, range.start.offset, String::new()))
            } else {
                Err(HostError::Unsupported("element selection"))
            };
        };
        let (parent, index) = self.index_in_parent(node).ok_or(HostError::Detached)?;
        let chars: Vec<char> = text.chars().collect();
        let (s, e) = (
            range.start.offset.min(range.end.offset).min(chars.len()),
            range.start.offset.max(range.end.offset).min(chars.len()),
        );
        let before: String = chars[..s].iter().collect();
        let selected: String = chars[s..e].iter().collect();
        let after: String = chars[e..].iter().collect();

        let mut insert_index = index;
        if before.is_empty() {
            self.detach(node);
        } else {
            if let NodeData::Text(t) = &mut self.nodes[node].data {
                *t = before;
            }
            insert_index += 1;
        }
        if !after.is_empty() {
            let a = self.text(&after);
            self.insert_at(parent, insert_index, a);
        }
        Ok((parent, insert_index, selected))
    }
}

/// Record of side effects that have no tree representation.
#[derive(Debug, Clone, Default)]
struct HostLog {
    commands: Vec<ExecutedCommand>,
    focused: Option<usize>,
    opened_urls: Vec<String>,
}

/// Arena-backed [`EditingHost`].
pub struct MemoryHost {
    tree: RefCell<Tree>,
    body: usize,
    selection: Cell<Option<MemRange>>,
    selection_rect: Cell<Option<Rect>>,
    viewport_width: Cell<f64>,
    log: RefCell<HostLog>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Create a document with an empty `<body>` and a 1024px viewport.
    pub fn new() -> Self {
        let mut tree = Tree::default();
        let body = tree.element("body", Vec::new());
        Self {
            tree: RefCell::new(tree),
            body,
            selection: Cell::new(None),
            selection_rect: Cell::new(None),
            viewport_width: Cell::new(1024.0),
            log: RefCell::new(HostLog::default()),
        }
    }

    /// Append a `<div>` holding `html` to the body.
    pub fn mount(&self, html: &str) -> NodeRef {
        let div = self.tree.borrow_mut().element("div", Vec::new());
        self.tree.borrow_mut().append(self.body, div);
        self.set_inner_html(&NodeRef(div), html);
        NodeRef(div)
    }

    /// Append an element described by `html` (a single root) to `parent`.
    pub fn append_html(&self, parent: &NodeRef, html: &str) -> Option<NodeRef> {
        let fragments = parse_fragment(html);
        let mut tree = self.tree.borrow_mut();
        let mut first = None;
        for fragment in &fragments {
            let n = tree.build(fragment);
            tree.append(parent.0, n);
            if first.is_none() && !tree.is_text(n) {
                first = Some(NodeRef(n));
            }
        }
        first
    }

    /// Serialized element including its own tag.
    pub fn outer_html(&self, node: &NodeRef) -> String {
        let mut out = String::new();
        self.tree.borrow().serialize(node.0, &mut out);
        out
    }

    /// First descendant of `root` with the given tag.
    pub fn first_with_tag(&self, root: &NodeRef, tag: &str) -> Option<NodeRef> {
        self.descendants_with_tag(root, tag).into_iter().next()
    }

    /// Select chars `start..end` of `element`'s text content.
    pub fn select_text(&self, element: &NodeRef, start: usize, end: usize) {
        let tree = self.tree.borrow();
        let range = MemRange {
            start: Self::locate(&tree, element.0, start),
            end: Self::locate(&tree, element.0, end),
        };
        self.selection.set(Some(range));
    }

    /// Select all text of `element`.
    pub fn select_contents(&self, element: &NodeRef) {
        let len = self.tree.borrow().text_len(element.0);
        self.select_text(element, 0, len);
    }

    pub fn clear_selection(&self) {
        self.selection.set(None);
    }

    pub fn set_selection_rect(&self, rect: Option<Rect>) {
        self.selection_rect.set(rect);
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.viewport_width.set(width);
    }

    pub fn set_element_size(&self, node: &NodeRef, size: Size) {
        if let Some(e) = self.tree.borrow_mut().el_mut(node.0) {
            e.size = size;
        }
    }

    /// Where [`EditingHost::place`] last put `node`.
    pub fn position(&self, node: &NodeRef) -> Option<Point> {
        self.tree.borrow().el(node.0).and_then(|e| e.position)
    }

    pub fn is_hidden(&self, node: &NodeRef) -> bool {
        self.tree.borrow().el(node.0).is_some_and(|e| e.hidden)
    }

    pub fn is_content_editable(&self, node: &NodeRef) -> bool {
        self.tree.borrow().el(node.0).is_some_and(|e| e.editable)
    }

    /// Whether `node` is reachable from the body.
    pub fn is_attached(&self, node: &NodeRef) -> bool {
        self.tree.borrow().root_of(node.0) == self.body
    }

    pub fn executed_commands(&self) -> Vec<ExecutedCommand> {
        self.log.borrow().commands.clone()
    }

    pub fn focused(&self) -> Option<NodeRef> {
        self.log.borrow().focused.map(NodeRef)
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.log.borrow().opened_urls.clone()
    }

    fn locate(tree: &Tree, element: usize, char_offset: usize) -> Boundary {
        let mut texts = Vec::new();
        tree.text_nodes_under(element, &mut texts);
        let mut remaining = char_offset;
        for t in &texts {
            let len = tree.text_len(*t);
            if remaining <= len {
                return Boundary {
                    node: *t,
                    offset: remaining,
                };
            }
            remaining -= len;
        }
        match texts.last() {
            Some(t) => Boundary {
                node: *t,
                offset: tree.text_len(*t),
            },
            None => Boundary {
                node: element,
                offset: 0,
            },
        }
    }

    fn forget_detached_selection(&self) {
        if let Some(range) = self.selection.get() {
            let tree = self.tree.borrow();
            if tree.root_of(range.start.node) != self.body || tree.root_of(range.end.node) != self.body
            {
                drop(tree);
                self.selection.set(None);
            }
        }
    }

    /// Wrap the current single-node selection in a new element.
    fn wrap_range(&self, tag: &str, attributes: Vec<(SmolStr, String)>) -> Result<usize, HostError> {
        let range = self.selection.get().ok_or(HostError::NoSelection)?;
        let mut tree = self.tree.borrow_mut();
        let (parent, index, selected) = tree.split_single_text(range)?;
        let wrapper = tree.element(tag, attributes);
        tree.insert_at(parent, index, wrapper);
        if selected.is_empty() {
            self.selection.set(Some(MemRange {
                start: Boundary {
                    node: wrapper,
                    offset: 0,
                },
                end: Boundary {
                    node: wrapper,
                    offset: 0,
                },
            }));
        } else {
            let len = selected.chars().count();
            let t = tree.text(&selected);
            tree.append(wrapper, t);
            self.selection.set(Some(MemRange {
                start: Boundary { node: t, offset: 0 },
                end: Boundary { node: t, offset: len },
            }));
        }
        Ok(wrapper)
    }

    /// Replace the current single-node selection with `nodes`.
    fn insert_nodes(&self, nodes: Vec<usize>) -> Result<(), HostError> {
        let range = self.selection.get().ok_or(HostError::NoSelection)?;
        let mut tree = self.tree.borrow_mut();
        let (parent, mut index, _) = tree.split_single_text(range)?;
        for n in nodes {
            tree.insert_at(parent, index, n);
            index += 1;
        }
        self.selection.set(Some(MemRange {
            start: Boundary {
                node: parent,
                offset: index,
            },
            end: Boundary {
                node: parent,
                offset: index,
            },
        }));
        Ok(())
    }

    fn toggle_inline(&self, tag: &str) -> Result<(), HostError> {
        let Some(selection) = self.selection() else {
            return Err(HostError::NoSelection);
        };
        if let Some(existing) = self.closest(&selection.container, tag) {
            return self.unwrap_node(&existing);
        }
        if selection.collapsed {
            return Ok(());
        }
        self.wrap_range(tag, Vec::new()).map(|_| ())
    }

    fn format_block(&self, value: &str) -> Result<(), HostError> {
        let tag = value.trim_matches(|c| c == '<' || c == '>').to_ascii_lowercase();
        let selection = self.selection().ok_or(HostError::NoSelection)?;
        let mut tree = self.tree.borrow_mut();
        for n in tree.ancestors_inclusive(selection.container.0) {
            let Some(e) = tree.el(n) else { continue };
            if e.attributes.iter().any(|(k, _)| k == "data-editor-id") {
                // Loose inline content directly in the surface: wrap it.
                let block = tree.element(&tag, Vec::new());
                for c in tree.nodes[n].children.clone() {
                    tree.append(block, c);
                }
                tree.append(n, block);
                return Ok(());
            }
            if BLOCK_TAGS.contains(&e.tag.as_str()) {
                if let Some(e) = tree.el_mut(n) {
                    e.tag = SmolStr::new(&tag);
                }
                return Ok(());
            }
        }
        Ok(())
    }
}

impl EditingHost for MemoryHost {
    type Node = NodeRef;

    fn selection(&self) -> Option<HostSelection<NodeRef>> {
        let range = self.selection.get()?;
        let tree = self.tree.borrow();
        let root = tree.root_of(range.start.node);
        let (a, b) = (tree.global_offset(range.start), tree.global_offset(range.end));
        let (s, e) = (a.min(b), a.max(b));
        let mut full = String::new();
        tree.text_content(root, &mut full);
        let text: String = full.chars().skip(s).take(e - s).collect();

        let ancestor = tree.common_ancestor(range.start.node, range.end.node);
        let container = if tree.is_text(ancestor) {
            tree.nodes[ancestor].parent?
        } else {
            ancestor
        };
        Some(HostSelection {
            text,
            container: NodeRef(container),
            collapsed: s == e,
        })
    }

    fn selection_rect(&self) -> Option<Rect> {
        self.selection.get()?;
        self.selection_rect.get()
    }

    fn enclosed_element(&self) -> Option<NodeRef> {
        let selection = self.selection()?;
        if selection.collapsed {
            return Some(selection.container);
        }
        if self.text_content(&selection.container) == selection.text {
            Some(selection.container)
        } else {
            None
        }
    }

    fn collapse_selection(&self, node: &NodeRef, offset: u32) {
        let b = Boundary {
            node: node.0,
            offset: offset as usize,
        };
        self.selection.set(Some(MemRange { start: b, end: b }));
    }

    fn wrap_selection(&self, wrapper: &ElementSpec) -> Result<NodeRef, HostError> {
        self.wrap_range(&wrapper.tag, wrapper.all_attributes())
            .map(NodeRef)
    }

    fn exec_command(&self, command: &str, value: Option<&str>) -> Result<(), HostError> {
        tracing::trace!(target: "quire::memory", command, ?value, "exec_command");
        self.log.borrow_mut().commands.push(ExecutedCommand {
            name: command.to_string(),
            value: value.map(str::to_string),
        });

        match command.to_ascii_lowercase().as_str() {
            "bold" => self.toggle_inline("b"),
            "italic" => self.toggle_inline("i"),
            "underline" => self.toggle_inline("u"),
            "strikethrough" => self.toggle_inline("s"),
            "formatblock" => self.format_block(value.unwrap_or("p")),
            "inserthtml" => {
                let fragments = parse_fragment(value.unwrap_or_default());
                let nodes = {
                    let mut tree = self.tree.borrow_mut();
                    fragments.iter().map(|f| tree.build(f)).collect()
                };
                self.insert_nodes(nodes)
            }
            "inserttext" => {
                let node = self.tree.borrow_mut().text(value.unwrap_or_default());
                self.insert_nodes(vec![node])
            }
            _ => Ok(()),
        }
    }

    fn focus(&self, node: &NodeRef) {
        self.log.borrow_mut().focused = Some(node.0);
    }

    fn body(&self) -> Option<NodeRef> {
        Some(NodeRef(self.body))
    }

    fn parent(&self, node: &NodeRef) -> Option<NodeRef> {
        self.tree.borrow().nodes.get(node.0)?.parent.map(NodeRef)
    }

    fn children(&self, node: &NodeRef) -> Vec<NodeRef> {
        let tree = self.tree.borrow();
        tree.nodes
            .get(node.0)
            .map(|n| {
                n.children
                    .iter()
                    .filter(|c| !tree.is_text(**c))
                    .map(|c| NodeRef(*c))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn tag_name(&self, node: &NodeRef) -> SmolStr {
        self.tree
            .borrow()
            .el(node.0)
            .map(|e| e.tag.clone())
            .unwrap_or_default()
    }

    fn create_element(&self, spec: &ElementSpec) -> Result<NodeRef, HostError> {
        let n = self
            .tree
            .borrow_mut()
            .element(&spec.tag, spec.all_attributes());
        let node = NodeRef(n);
        if let Some(html) = &spec.html {
            self.set_inner_html(&node, html);
        }
        for (label, value) in &spec.options {
            let mut attributes = vec![(SmolStr::new_static("value"), value.clone())];
            if spec.option_to_class {
                attributes.push((SmolStr::new_static("class"), value.clone()));
            }
            let mut tree = self.tree.borrow_mut();
            let option = tree.element("option", attributes);
            let text = tree.text(label);
            tree.append(option, text);
            tree.append(n, option);
        }
        Ok(node)
    }

    fn append_child(&self, parent: &NodeRef, child: &NodeRef) -> Result<(), HostError> {
        let mut tree = self.tree.borrow_mut();
        tree.check_insert(parent.0, child.0)?;
        tree.append(parent.0, child.0);
        Ok(())
    }

    fn insert_before(&self, reference: &NodeRef, node: &NodeRef) -> Result<(), HostError> {
        let mut tree = self.tree.borrow_mut();
        let (parent, _) = tree.index_in_parent(reference.0).ok_or(HostError::Detached)?;
        tree.check_insert(parent, node.0)?;
        tree.detach(node.0);
        let (parent, index) = tree.index_in_parent(reference.0).ok_or(HostError::Detached)?;
        tree.insert_at(parent, index, node.0);
        Ok(())
    }

    fn insert_after(&self, reference: &NodeRef, node: &NodeRef) -> Result<(), HostError> {
        let mut tree = self.tree.borrow_mut();
        let (parent, _) = tree.index_in_parent(reference.0).ok_or(HostError::Detached)?;
        tree.check_insert(parent, node.0)?;
        tree.detach(node.0);
        let (parent, index) = tree.index_in_parent(reference.0).ok_or(HostError::Detached)?;
        tree.insert_at(parent, index + 1, node.0);
        Ok(())
    }

    fn replace_node(&self, old: &NodeRef, new: &NodeRef) -> Result<(), HostError> {
        {
            let mut tree = self.tree.borrow_mut();
            let (parent, index) = tree.index_in_parent(old.0).ok_or(HostError::Detached)?;
            tree.check_insert(parent, new.0)?;
            tree.detach(old.0);
            tree.insert_at(parent, index, new.0);
        }
        self.forget_detached_selection();
        Ok(())
    }

    fn remove_node(&self, node: &NodeRef) -> Result<(), HostError> {
        self.tree.borrow_mut().detach(node.0);
        self.forget_detached_selection();
        Ok(())
    }

    fn unwrap_node(&self, node: &NodeRef) -> Result<(), HostError> {
        let mut tree = self.tree.borrow_mut();
        let (parent, index) = tree.index_in_parent(node.0).ok_or(HostError::Detached)?;
        let children = tree.nodes[node.0].children.clone();
        tree.detach(node.0);
        for (i, c) in children.into_iter().enumerate() {
            tree.insert_at(parent, index + i, c);
        }
        Ok(())
    }

    fn find_with_attribute(&self, root: Option<&NodeRef>, attribute: &str) -> Vec<NodeRef> {
        let tree = self.tree.borrow();
        let start = root.map(|r| r.0).unwrap_or(self.body);
        let mut found = Vec::new();
        let mut stack: Vec<usize> = tree.nodes[start].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if let Some(e) = tree.el(n) {
                if e.attributes.iter().any(|(k, _)| k == attribute) {
                    found.push(NodeRef(n));
                }
                stack.extend(tree.nodes[n].children.iter().rev().copied());
            }
        }
        found
    }

    fn attribute(&self, node: &NodeRef, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        tree.el(node.0)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&self, node: &NodeRef, name: &str, value: &str) {
        if let Some(e) = self.tree.borrow_mut().el_mut(node.0) {
            match e.attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => e.attributes.push((SmolStr::new(name), value.to_string())),
            }
        }
    }

    fn remove_attribute(&self, node: &NodeRef, name: &str) {
        if let Some(e) = self.tree.borrow_mut().el_mut(node.0) {
            e.attributes.retain(|(k, _)| k != name);
        }
    }

    fn attribute_count(&self, node: &NodeRef) -> usize {
        self.tree
            .borrow()
            .el(node.0)
            .map(|e| e.attributes.len())
            .unwrap_or(0)
    }

    fn add_class(&self, node: &NodeRef, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let classes = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &classes);
    }

    fn remove_class(&self, node: &NodeRef, class: &str) {
        if let Some(existing) = self.attribute(node, "class") {
            let kept: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
            self.set_attribute(node, "class", &kept.join(" "));
        }
    }

    fn has_class(&self, node: &NodeRef, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    fn inner_html(&self, node: &NodeRef) -> String {
        let mut out = String::new();
        self.tree.borrow().serialize_children(node.0, &mut out);
        out
    }

    fn set_inner_html(&self, node: &NodeRef, html: &str) {
        {
            let mut tree = self.tree.borrow_mut();
            tree.clear_children(node.0);
            for fragment in parse_fragment(html) {
                let c = tree.build(&fragment);
                tree.append(node.0, c);
            }
        }
        self.forget_detached_selection();
    }

    fn text_content(&self, node: &NodeRef) -> String {
        let mut out = String::new();
        self.tree.borrow().text_content(node.0, &mut out);
        out
    }

    fn set_text_content(&self, node: &NodeRef, text: &str) {
        {
            let mut tree = self.tree.borrow_mut();
            tree.clear_children(node.0);
            if !text.is_empty() {
                let t = tree.text(text);
                tree.append(node.0, t);
            }
        }
        self.forget_detached_selection();
    }

    fn set_content_editable(&self, node: &NodeRef, editable: bool) {
        if let Some(e) = self.tree.borrow_mut().el_mut(node.0) {
            e.editable = editable;
        }
    }

    fn set_hidden(&self, node: &NodeRef, hidden: bool) {
        if let Some(e) = self.tree.borrow_mut().el_mut(node.0) {
            e.hidden = hidden;
        }
    }

    fn value(&self, node: &NodeRef) -> Option<String> {
        let tag = self.tag_name(node);
        if let Some(v) = self.tree.borrow().el(node.0).and_then(|e| e.value.clone()) {
            return Some(v);
        }
        match tag.as_str() {
            "textarea" => Some(self.text_content(node)),
            "input" => Some(self.attribute(node, "value").unwrap_or_default()),
            "select" => Some(
                self.children(node)
                    .first()
                    .and_then(|o| self.attribute(o, "value"))
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    fn set_value(&self, node: &NodeRef, value: &str) {
        if let Some(e) = self.tree.borrow_mut().el_mut(node.0) {
            e.value = Some(value.to_string());
        }
    }

    fn checked(&self, node: &NodeRef) -> bool {
        self.tree.borrow().el(node.0).is_some_and(|e| e.checked)
    }

    fn set_checked(&self, node: &NodeRef, checked: bool) {
        if let Some(e) = self.tree.borrow_mut().el_mut(node.0) {
            e.checked = checked;
        }
    }

    fn element_size(&self, node: &NodeRef) -> Size {
        self.tree
            .borrow()
            .el(node.0)
            .map(|e| e.size)
            .unwrap_or_default()
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width.get()
    }

    fn place(&self, node: &NodeRef, at: Point) {
        if let Some(e) = self.tree.borrow_mut().el_mut(node.0) {
            e.position = Some(at);
        }
    }

    fn open_url(&self, url: &str) {
        self.log.borrow_mut().opened_urls.push(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_and_serialize() {
        let host = MemoryHost::new();
        let root = host.mount("<p>hello <b>world</b></p>");
        insta::assert_snapshot!(host.inner_html(&root), @"<p>hello <b>world</b></p>");
        assert_eq!(host.text_content(&root), "hello world");
    }

    #[test]
    fn test_selection_container_and_text() {
        let host = MemoryHost::new();
        let root = host.mount("<p>hello <b>world</b></p>");
        let b = host.first_with_tag(&root, "b").unwrap();
        host.select_text(&b, 1, 4);
        let sel = host.selection().unwrap();
        assert_eq!(sel.text, "orl");
        assert_eq!(sel.container, b);
        assert!(!sel.collapsed);

        let p = host.first_with_tag(&root, "p").unwrap();
        host.select_text(&p, 3, 8);
        let sel = host.selection().unwrap();
        assert_eq!(sel.text, "lo wo");
        assert_eq!(sel.container, p);
    }

    #[test]
    fn test_wrap_selection_splits_text() {
        let host = MemoryHost::new();
        let root = host.mount("<p>abcdef</p>");
        let p = host.first_with_tag(&root, "p").unwrap();
        host.select_text(&p, 2, 4);
        let marker = host
            .wrap_selection(&ElementSpec::new("span").with_attribute("data-marker", "editor"))
            .unwrap();
        insta::assert_snapshot!(host.inner_html(&root), @r#"<p>ab<span data-marker="editor">cd</span>ef</p>"#);
        assert_eq!(host.selection().unwrap().container, marker);
    }

    #[test]
    fn test_unwrap_keeps_children_in_place() {
        let host = MemoryHost::new();
        let root = host.mount("<p>a<i>b<u>c</u></i>d</p>");
        let i = host.first_with_tag(&root, "i").unwrap();
        host.unwrap_node(&i).unwrap();
        insta::assert_snapshot!(host.inner_html(&root), @"<p>ab<u>c</u>d</p>");
    }

    #[test]
    fn test_insert_into_own_descendant_is_refused() {
        let host = MemoryHost::new();
        let root = host.mount("<p>a<i>b</i></p>");
        let p = host.first_with_tag(&root, "p").unwrap();
        let i = host.first_with_tag(&root, "i").unwrap();

        assert!(matches!(host.append_child(&i, &p), Err(HostError::Unsupported(_))));
        assert!(matches!(host.append_child(&p, &p), Err(HostError::Unsupported(_))));
        assert!(matches!(host.insert_after(&i, &p), Err(HostError::Unsupported(_))));
        insta::assert_snapshot!(host.inner_html(&root), @"<p>a<i>b</i></p>");

        host.append_child(&root, &i).unwrap();
        insta::assert_snapshot!(host.inner_html(&root), @"<p>a</p><i>b</i>");
    }

    #[test]
    fn test_bold_toggles() {
        let host = MemoryHost::new();
        let root = host.mount("<p>abc</p>");
        let p = host.first_with_tag(&root, "p").unwrap();
        host.select_text(&p, 0, 3);
        host.exec_command("bold", None).unwrap();
        assert_eq!(host.inner_html(&root), "<p><b>abc</b></p>");
        host.exec_command("bold", None).unwrap();
        assert_eq!(host.inner_html(&root), "<p>abc</p>");
        assert_eq!(host.executed_commands().len(), 2);
    }

    #[test]
    fn test_format_block_renames_block() {
        let host = MemoryHost::new();
        let root = host.mount("<p>title</p>");
        host.set_attribute(&root, "data-editor-id", "e");
        let p = host.first_with_tag(&root, "p").unwrap();
        host.select_text(&p, 0, 0);
        host.exec_command("formatblock", Some("<h1>")).unwrap();
        assert_eq!(host.inner_html(&root), "<h1>title</h1>");
    }

    #[test]
    fn test_insert_html_replaces_selection() {
        let host = MemoryHost::new();
        let root = host.mount("<p>xyz</p>");
        let p = host.first_with_tag(&root, "p").unwrap();
        host.select_text(&p, 1, 2);
        host.exec_command("insertHTML", Some("<table><tr><td>y</td><td></td></tr></table>"))
            .unwrap();
        assert_eq!(
            host.inner_html(&root),
            "<p>x<table><tr><td>y</td><td></td></tr></table>z</p>"
        );
    }

    #[test]
    fn test_select_options() {
        let host = MemoryHost::new();
        let mut spec = ElementSpec::new("select");
        spec.options = vec![("none".into(), "".into()), ("primary".into(), "button primary".into())];
        spec.option_to_class = true;
        let select = host.create_element(&spec).unwrap();
        assert_eq!(host.children(&select).len(), 2);
        assert_eq!(host.value(&select).as_deref(), Some(""));
        host.set_value(&select, "button primary");
        assert_eq!(host.value(&select).as_deref(), Some("button primary"));
        assert!(host.has_class(&host.children(&select)[1], "primary"));
    }
}
