//! Native event extraction.
//!
//! Converts DOM events into the core's [`Interaction`] values and answers
//! the "where did this land" questions the delegation layer needs.

use quire_editor_core::{Interaction, InteractionKind, Key, Point};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, KeyboardEvent, MouseEvent, Node};

/// Attribute carried by every toolbar surface.
pub const TOOLBAR_ATTRIBUTE: &str = "data-editor-toolbar-id";
/// Attribute carried by every toolbar item element.
pub const ITEM_ATTRIBUTE: &str = "data-item-key";

/// Element the event was dispatched to; text node targets resolve to their
/// parent element.
pub fn target_element(event: &Event) -> Option<Element> {
    let node = event.target()?.dyn_into::<Node>().ok()?;
    match node.dyn_into::<Element>() {
        Ok(el) => Some(el),
        Err(node) => node.parent_element(),
    }
}

/// Toolbar id and item key of a toolbar control under `target`.
pub fn toolbar_item(target: &Element) -> Option<(String, String)> {
    let item = target.closest(&format!("[{ITEM_ATTRIBUTE}]")).ok()??;
    let toolbar = item.closest(&format!("[{TOOLBAR_ATTRIBUTE}]")).ok()??;
    Some((
        toolbar.get_attribute(TOOLBAR_ATTRIBUTE)?,
        item.get_attribute(ITEM_ATTRIBUTE)?,
    ))
}

/// Whether `target` lies inside any toolbar surface.
pub fn in_toolbar(target: &Element) -> bool {
    target
        .closest(&format!("[{TOOLBAR_ATTRIBUTE}]"))
        .ok()
        .flatten()
        .is_some()
}

pub fn mouse_interaction(kind: InteractionKind, event: &MouseEvent) -> Interaction<Element> {
    let page = Point::new(event.page_x() as f64, event.page_y() as f64);
    let interaction = Interaction::mouse(kind, page).with_shift(event.shift_key());
    match target_element(event) {
        Some(target) => interaction.with_target(target),
        None => interaction,
    }
}

pub fn key_interaction(kind: InteractionKind, event: &KeyboardEvent) -> Interaction<Element> {
    let interaction = Interaction::key(kind, Key::from_dom(&event.key())).with_shift(event.shift_key());
    match target_element(event) {
        Some(target) => interaction.with_target(target),
        None => interaction,
    }
}

/// Build the interaction for any event routed to an editor surface.
pub fn interaction(kind: InteractionKind, event: &Event) -> Interaction<Element> {
    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        return mouse_interaction(kind, mouse);
    }
    if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
        return key_interaction(kind, key);
    }
    let interaction = Interaction::new(kind);
    match target_element(event) {
        Some(target) => interaction.with_target(target),
        None => interaction,
    }
}
