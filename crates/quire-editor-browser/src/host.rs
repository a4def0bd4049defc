//! `EditingHost` over the live DOM.
//!
//! Nodes are `web_sys::Element`s. Selection queries go through the
//! `Selection`/`Range` API; formatting commands through
//! `document.execCommand`, which is what contenteditable surfaces still
//! rely on for undo integration.

use quire_editor_core::{EditingHost, ElementSpec, HostError, HostSelection, Point, Rect, Size};
use smol_str::SmolStr;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlDocument, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, Node, Range, Selection, Window,
};

fn dom_error(e: JsValue) -> HostError {
    let message = match e.dyn_ref::<js_sys::Error>() {
        Some(err) => String::from(err.message()),
        None => e.as_string().unwrap_or_else(|| format!("{e:?}")),
    };
    HostError::Dom(message)
}

/// Element owning a node; text nodes resolve to their parent.
fn owning_element(node: Node) -> Option<Element> {
    if node.node_type() == Node::ELEMENT_NODE {
        node.dyn_into::<Element>().ok()
    } else {
        node.parent_element()
    }
}

/// Browser implementation of [`EditingHost`].
#[derive(Debug, Clone)]
pub struct BrowserHost {
    window: Window,
    document: Document,
}

impl BrowserHost {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    /// Host for the global window, if running in a page.
    pub fn from_window() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self::new(window, document))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn dom_selection(&self) -> Option<Selection> {
        self.window.get_selection().ok()?
    }

    fn range(&self) -> Option<Range> {
        let selection = self.dom_selection()?;
        if selection.range_count() == 0 {
            return None;
        }
        selection.get_range_at(0).ok()
    }

    fn scroll(&self) -> Point {
        Point::new(
            self.window.scroll_x().unwrap_or_default(),
            self.window.scroll_y().unwrap_or_default(),
        )
    }

    fn style_property(&self, node: &Element, name: &str, value: Option<&str>) {
        let Some(el) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = el.style();
        let result = match value {
            Some(v) => style.set_property(name, v),
            None => style.remove_property(name).map(|_| ()),
        };
        if let Err(e) = result {
            tracing::debug!(target: "quire::host", property = name, error = ?e, "style update failed");
        }
    }

    fn create_option(&self, select: &Element, label: &str, value: &str, as_class: bool) -> Result<(), JsValue> {
        let option = self.document.create_element("option")?;
        option.set_attribute("value", value)?;
        if as_class && !value.is_empty() {
            option.set_attribute("class", value)?;
        }
        option.set_text_content(Some(label));
        select.append_child(&option)?;
        Ok(())
    }
}

impl EditingHost for BrowserHost {
    type Node = Element;

    fn selection(&self) -> Option<HostSelection<Element>> {
        let selection = self.dom_selection()?;
        if selection.range_count() == 0 {
            return None;
        }
        let range = selection.get_range_at(0).ok()?;
        let container = owning_element(range.common_ancestor_container().ok()?)?;
        Some(HostSelection {
            text: String::from(selection.to_string()),
            container,
            collapsed: selection.is_collapsed(),
        })
    }

    /// First client rect of the range, in page coordinates.
    fn selection_rect(&self) -> Option<Rect> {
        let rects = self.range()?.get_client_rects()?;
        let rect = rects.get(0)?;
        let scroll = self.scroll();
        Some(Rect::new(
            rect.left() + scroll.x,
            rect.top() + scroll.y,
            rect.width(),
            rect.height(),
        ))
    }

    fn enclosed_element(&self) -> Option<Element> {
        let range = self.range()?;
        if range.collapsed() {
            return owning_element(range.common_ancestor_container().ok()?);
        }

        let start = range.start_container().ok()?;
        let end = range.end_container().ok()?;
        let start_offset = range.start_offset().ok()?;
        let end_offset = range.end_offset().ok()?;
        let end_is_text = end.node_type() == Node::TEXT_NODE;
        let end_len = end.text_content().map(|t| t.encode_utf16().count() as u32).unwrap_or(0);

        if start == end && start_offset == 0 && end_is_text && end_len == end_offset {
            return start.parent_element();
        }

        // Range ending at the close of the last child of the start's parent.
        if start_offset == 0 && end_is_text && end_len == end_offset {
            let start_parent = start.parent_element()?;
            let end_parent = end.parent_element()?;
            if end_parent.next_sibling().is_none() && start_parent.contains(Some(end_parent.as_ref())) {
                return Some(start_parent);
            }
        }
        None
    }

    fn collapse_selection(&self, node: &Element, offset: u32) {
        if let Some(selection) = self.dom_selection()
            && let Err(e) = selection.collapse_with_offset(Some(node.as_ref()), offset)
        {
            tracing::debug!(target: "quire::host", error = ?e, "collapse failed");
        }
    }

    fn wrap_selection(&self, wrapper: &ElementSpec) -> Result<Element, HostError> {
        let range = self.range().ok_or(HostError::NoSelection)?;
        let el = self.create_element(wrapper)?;
        let contents = range.extract_contents().map_err(dom_error)?;
        el.append_child(&contents).map_err(dom_error)?;
        range.insert_node(&el).map_err(dom_error)?;
        range.select_node_contents(&el).map_err(dom_error)?;
        if let Some(selection) = self.dom_selection() {
            selection.remove_all_ranges().map_err(dom_error)?;
            selection.add_range(&range).map_err(dom_error)?;
        }
        Ok(el)
    }

    fn exec_command(&self, command: &str, value: Option<&str>) -> Result<(), HostError> {
        let document = self
            .document
            .dyn_ref::<HtmlDocument>()
            .ok_or(HostError::Unsupported("execCommand"))?;
        let handled = match value {
            Some(v) => document.exec_command_with_show_ui_and_value(command, false, v),
            None => document.exec_command(command),
        }
        .map_err(dom_error)?;
        if !handled {
            tracing::debug!(target: "quire::host", command, "execCommand reported no effect");
        }
        Ok(())
    }

    fn focus(&self, node: &Element) {
        if let Some(el) = node.dyn_ref::<HtmlElement>()
            && let Err(e) = el.focus()
        {
            tracing::debug!(target: "quire::host", error = ?e, "focus failed");
        }
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();
        (0..children.length()).filter_map(|i| children.item(i)).collect()
    }

    fn tag_name(&self, node: &Element) -> SmolStr {
        SmolStr::new(node.tag_name().to_ascii_lowercase())
    }

    fn create_element(&self, spec: &ElementSpec) -> Result<Element, HostError> {
        let el = self.document.create_element(&spec.tag).map_err(dom_error)?;
        for (name, value) in spec.all_attributes() {
            el.set_attribute(&name, &value).map_err(dom_error)?;
        }
        if let Some(html) = &spec.html {
            el.set_inner_html(html);
        }
        for (label, value) in &spec.options {
            self.create_option(&el, label, value, spec.option_to_class)
                .map_err(dom_error)?;
        }
        Ok(el)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), HostError> {
        parent.append_child(child).map(|_| ()).map_err(dom_error)
    }

    fn insert_before(&self, reference: &Element, node: &Element) -> Result<(), HostError> {
        if reference.parent_node().is_none() {
            return Err(HostError::Detached);
        }
        reference.before_with_node_1(node).map_err(dom_error)
    }

    fn insert_after(&self, reference: &Element, node: &Element) -> Result<(), HostError> {
        if reference.parent_node().is_none() {
            return Err(HostError::Detached);
        }
        reference.after_with_node_1(node).map_err(dom_error)
    }

    fn replace_node(&self, old: &Element, new: &Element) -> Result<(), HostError> {
        if old.parent_node().is_none() {
            return Err(HostError::Detached);
        }
        old.replace_with_with_node_1(new).map_err(dom_error)
    }

    fn remove_node(&self, node: &Element) -> Result<(), HostError> {
        if node.parent_node().is_none() {
            return Err(HostError::Detached);
        }
        node.remove();
        Ok(())
    }

    fn unwrap_node(&self, node: &Element) -> Result<(), HostError> {
        let parent = node.parent_node().ok_or(HostError::Detached)?;
        while let Some(child) = node.first_child() {
            parent.insert_before(&child, Some(node.as_ref())).map_err(dom_error)?;
        }
        node.remove();
        Ok(())
    }

    fn find_with_attribute(&self, root: Option<&Element>, attribute: &str) -> Vec<Element> {
        let selector = format!("[{attribute}]");
        let found = match root {
            Some(root) => root.query_selector_all(&selector),
            None => self.document.query_selector_all(&selector),
        };
        let Ok(list) = found else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        if let Err(e) = node.set_attribute(name, value) {
            tracing::debug!(target: "quire::host", attribute = name, error = ?e, "set_attribute failed");
        }
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn attribute_count(&self, node: &Element) -> usize {
        node.attributes().length() as usize
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn set_inner_html(&self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_content_editable(&self, node: &Element, editable: bool) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            el.set_content_editable(if editable { "true" } else { "false" });
        }
    }

    fn set_hidden(&self, node: &Element, hidden: bool) {
        self.style_property(node, "display", hidden.then_some("none"));
    }

    fn value(&self, node: &Element) -> Option<String> {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            Some(input.value())
        } else if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
            Some(textarea.value())
        } else {
            node.dyn_ref::<HtmlSelectElement>().map(HtmlSelectElement::value)
        }
    }

    fn set_value(&self, node: &Element, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
            textarea.set_value(value);
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        }
    }

    fn checked(&self, node: &Element) -> bool {
        node.dyn_ref::<HtmlInputElement>().is_some_and(HtmlInputElement::checked)
    }

    fn set_checked(&self, node: &Element, checked: bool) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_checked(checked);
        }
    }

    fn element_size(&self, node: &Element) -> Size {
        let rect = node.get_bounding_client_rect();
        Size::new(rect.width(), rect.height())
    }

    fn viewport_width(&self) -> f64 {
        self.document
            .document_element()
            .map(|el| el.client_width() as f64)
            .unwrap_or_default()
    }

    fn place(&self, node: &Element, at: Point) {
        self.style_property(node, "left", Some(&format!("{}px", at.x)));
        self.style_property(node, "top", Some(&format!("{}px", at.y)));
    }

    fn open_url(&self, url: &str) {
        if let Err(e) = self.window.open_with_url_and_target(url, "_blank") {
            tracing::warn!(target: "quire::host", url, error = ?e, "failed to open url");
        }
    }
}
