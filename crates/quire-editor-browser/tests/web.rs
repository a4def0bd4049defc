//! WASM browser tests for quire-editor-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use quire_editor_browser::{
    BrowserHost, DomEditors, EditingHost, EditorConfig, EditorContext, ElementSpec, plugins,
};
use web_sys::{Element, HtmlElement};

fn host() -> BrowserHost {
    BrowserHost::from_window().expect("running in a browser")
}

/// Mount `html` in a fresh container attached to the body.
fn fixture(html: &str) -> Element {
    let document = gloo_utils::document();
    let container = document.create_element("div").unwrap();
    container.set_inner_html(html);
    gloo_utils::body().append_child(&container).unwrap();
    container
}

/// Select chars `start..end` of the first text node of `el`.
fn select(el: &Element, start: u32, end: u32) {
    let text = el.first_child().unwrap();
    let range = gloo_utils::document().create_range().unwrap();
    range.set_start(&text, start).unwrap();
    range.set_end(&text, end).unwrap();
    let selection = gloo_utils::window().get_selection().unwrap().unwrap();
    selection.remove_all_ranges().unwrap();
    selection.add_range(&range).unwrap();
}

// === BrowserHost tests ===

#[wasm_bindgen_test]
fn test_create_element_from_spec() {
    let host = host();
    let mut spec = ElementSpec::new("select").with_attribute("data-style", "true");
    spec.options = vec![("none".into(), "".into()), ("red".into(), "red".into())];
    spec.option_to_class = true;
    let el = host.create_element(&spec).unwrap();
    assert_eq!(
        el.outer_html(),
        r#"<select data-style="true"><option value="">none</option><option value="red" class="red">red</option></select>"#
    );
}

#[wasm_bindgen_test]
fn test_selection_text_and_container() {
    let host = host();
    let container = fixture("<p>some text</p>");
    let p = container.first_element_child().unwrap();
    select(&p, 0, 4);

    let selection = host.selection().unwrap();
    assert_eq!(selection.text, "some");
    assert_eq!(selection.container, p);
    assert!(!selection.collapsed);
    assert_eq!(host.enclosed_element(), None);

    select(&p, 0, 9);
    assert_eq!(host.enclosed_element(), Some(p));
    container.remove();
}

#[wasm_bindgen_test]
fn test_wrap_and_unwrap_selection() {
    let host = host();
    let container = fixture("<p>pick me</p>");
    let p = container.first_element_child().unwrap();
    select(&p, 0, 4);

    let marker = host
        .wrap_selection(&ElementSpec::new("span").with_attribute("data-marker", "editor"))
        .unwrap();
    assert_eq!(p.inner_html(), r#"<span data-marker="editor">pick</span> me"#);

    host.unwrap_node(&marker).unwrap();
    assert_eq!(p.inner_html(), "pick me");
    container.remove();
}

#[wasm_bindgen_test]
fn test_structural_edits() {
    let host = host();
    let container = fixture("<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>");
    let b = container.query_selector("td:last-child").unwrap().unwrap();
    assert_eq!(host.element_index(&b), Some(1));

    let td = host.create_element(&ElementSpec::new("td").with_html("x")).unwrap();
    host.insert_before(&b, &td).unwrap();
    host.remove_node(&b).unwrap();
    assert_eq!(host.children(&host.parent(&td).unwrap()).len(), 2);
    assert_eq!(host.tag_name(&td), "td");

    let detached = host.create_element(&ElementSpec::new("p")).unwrap();
    assert!(host.remove_node(&detached).is_err());
    container.remove();
}

#[wasm_bindgen_test]
fn test_form_values() {
    let host = host();
    let container = fixture(r#"<input type="text" value="a"><input type="checkbox"><textarea>t</textarea>"#);
    let children = host.children(&container);
    assert_eq!(host.value(&children[0]).as_deref(), Some("a"));
    host.set_value(&children[0], "b");
    assert_eq!(host.value(&children[0]).as_deref(), Some("b"));

    assert!(!host.checked(&children[1]));
    host.set_checked(&children[1], true);
    assert!(host.checked(&children[1]));

    assert_eq!(host.value(&children[2]).as_deref(), Some("t"));
    assert_eq!(host.value(&container), None);
    container.remove();
}

// === Delegation tests ===

#[wasm_bindgen_test]
fn test_editor_mount_and_toolbar_click() {
    let mut ctx = EditorContext::new(host());
    ctx.plugins(plugins::defaults());
    ctx.init();

    let container = fixture("<p>bold me</p>");
    let id = ctx
        .create_editor(container.clone(), EditorConfig::default().with_toolbar(["bold"]))
        .unwrap();
    let editors = DomEditors::attach(ctx);

    assert_eq!(container.get_attribute("contenteditable").as_deref(), Some("true"));
    assert_eq!(container.get_attribute("data-editor-type").as_deref(), Some("editor"));
    let button = gloo_utils::document()
        .query_selector(&format!(r#"[data-editor-toolbar-id="{id}"] [data-item-key="bold"]"#))
        .unwrap()
        .unwrap();

    let p = container.first_element_child().unwrap();
    editors.with(|ctx| ctx.set_active_editor(&id)).unwrap();
    select(&p, 0, 4);
    button.dyn_ref::<HtmlElement>().unwrap().click();

    assert!(p.inner_html().starts_with("<b>bold</b>"));
    assert!(!editors.is_busy());

    editors.with(|ctx| ctx.destroy_editor(&id)).unwrap();
    assert_eq!(container.get_attribute("data-editor-type"), None);
    container.remove();
}

#[wasm_bindgen_test]
fn test_outside_click_clears_active_editor() {
    let mut ctx = EditorContext::new(host());
    ctx.init();
    let container = fixture("<p>text</p>");
    let id = ctx.create_editor(container.clone(), EditorConfig::default()).unwrap();
    ctx.set_active_editor(&id);
    let editors = DomEditors::attach(ctx);

    let outside = fixture("<span>elsewhere</span>");
    outside
        .first_element_child()
        .unwrap()
        .dyn_ref::<HtmlElement>()
        .unwrap()
        .click();

    assert_eq!(editors.with(|ctx| ctx.active_editor_id()).unwrap(), None);
    container.remove();
    outside.remove();
}
