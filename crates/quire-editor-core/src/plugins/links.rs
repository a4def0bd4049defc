//! Link editing through the `link` sub-toolbar.

use super::{control, control_value, sub_toolbar};
use crate::context::EditorContext;
use crate::event::EventKind;
use crate::host::{EditingHost, ElementSpec};
use crate::html::escape_html;
use crate::interaction::InteractionKind;
use crate::plugin::Plugin;
use crate::toolbar::{ItemTrigger, PositionRequest, ToolbarItem};

pub const LINK_TOOLBAR: &str = "link";

const INPUT: &str = "link.input";
const NEW_WINDOW: &str = "link.window";
const CLASS: &str = "link.class";
const DELETE: &str = "link.delete";

const LINK_CLASSES: [(&str, &str); 7] = [
    ("none", ""),
    ("button default", "button"),
    ("button default fit", "button fit"),
    ("button primary", "button primary"),
    ("button primary fit", "button primary fit"),
    ("button secondary", "button secondary"),
    ("button secondary fit", "button secondary fit"),
];

fn templates<H: EditingHost>() -> Vec<ToolbarItem<H>> {
    vec![
        ToolbarItem::<H>::button("link.insert")
            .html("&#10004; insert")
            .title("Insert link")
            .build_default(false)
            .on_click(insert::<H>),
        ToolbarItem::<H>::button(DELETE)
            .html("&#10008;")
            .title("Unlink")
            .build_default(false)
            .on_click(|ctx, trigger| {
                let anchor = trigger
                    .editor
                    .as_deref()
                    .and_then(|editor| ctx.saved_selection(editor))
                    .and_then(|saved| saved.element)
                    .and_then(|el| ctx.host().closest(&el, "a"));
                if let Some(anchor) = anchor
                    && let Err(e) = ctx.host().unwrap_node(&anchor)
                {
                    tracing::warn!(target: "quire::plugin", error = %e, "failed to unlink");
                }
                ctx.close_toolbar(&trigger.toolbar, true);
            }),
        ToolbarItem::<H>::button("link.visit")
            .html("visit")
            .title("Visit link")
            .build_default(false)
            .on_click(|ctx, trigger| {
                let url = control_value(ctx, &trigger.toolbar, INPUT);
                if !url.is_empty() {
                    ctx.host().open_url(&url);
                }
            }),
        ToolbarItem::<H>::input(INPUT, "text")
            .placeholder("Url")
            .class("etb-full-width")
            .build_default(false),
        ToolbarItem::<H>::input(NEW_WINDOW, "checkbox").id("link_window"),
        ToolbarItem::<H>::label("link.windowLabel", "link_window").html("Open on new window"),
        ToolbarItem::<H>::select(CLASS)
            .id("link_class")
            .title("Link style")
            .options(LINK_CLASSES)
            .build_default(false),
    ]
}

/// Create or update the anchor for the saved selection from the control
/// values.
fn insert<H: EditingHost>(ctx: &mut EditorContext<H>, trigger: &ItemTrigger<H::Node>) {
    let Some(editor) = trigger.editor.clone() else {
        return;
    };
    let Some(saved) = ctx.saved_selection(&editor) else {
        return;
    };
    let toolbar = trigger.toolbar.as_str();
    let href = control_value(ctx, toolbar, INPUT);
    let new_window = control(ctx, toolbar, NEW_WINDOW).is_some_and(|el| ctx.host().checked(&el));
    let class = control_value(ctx, toolbar, CLASS);

    let anchor = match saved.element.filter(|_| saved.tag_name == "a") {
        Some(anchor) => Some(anchor),
        None => {
            let spec = ElementSpec::new("a").with_html(escape_html(&saved.text));
            match ctx.host().create_element(&spec) {
                Ok(anchor) => {
                    let placed = ctx
                        .with_editor(&editor, |e, host| e.selection_mut().replace(host, &anchor))
                        .unwrap_or(false);
                    placed.then_some(anchor)
                }
                Err(e) => {
                    tracing::warn!(target: "quire::plugin", error = %e, "failed to create link");
                    None
                }
            }
        }
    };

    if let Some(anchor) = anchor {
        let host = ctx.host();
        host.set_attribute(&anchor, "href", &href);
        if new_window {
            host.set_attribute(&anchor, "target", "_blank");
            host.set_attribute(&anchor, "rel", "noopener noreferrer");
        } else {
            host.remove_attribute(&anchor, "target");
            host.remove_attribute(&anchor, "rel");
        }
        if class.is_empty() {
            host.remove_attribute(&anchor, "class");
        } else {
            host.set_attribute(&anchor, "class", &class);
        }
    } else {
        tracing::debug!(target: "quire::plugin", editor = %editor, "no selection to link");
    }

    if let Some(input) = control(ctx, toolbar, INPUT) {
        ctx.host().set_value(&input, "");
    }
    ctx.close_toolbar(toolbar, true);
}

pub fn links<H: EditingHost>() -> Plugin<H> {
    Plugin::<H>::new("links")
        .on(EventKind::EditorsInit, |ctx, _| {
            if !ctx.toolbars().has(LINK_TOOLBAR) {
                for item in templates() {
                    ctx.add_template(item);
                }
                sub_toolbar(
                    ctx,
                    LINK_TOOLBAR,
                    &[
                        "back", "link.visit", DELETE, "link.insert", "_", INPUT, "_", "__",
                        NEW_WINDOW, "link.windowLabel", "__", "_", CLASS,
                    ],
                );
            }

            ctx.add_template(
                ToolbarItem::<H>::button("link")
                    .title("Link")
                    .html("&#128279;")
                    .tag_name("a")
                    .on_click(|ctx, trigger| {
                        let Some(editor) = &trigger.editor else {
                            return;
                        };
                        ctx.save_selection(editor, true);
                        ctx.open_toolbar(LINK_TOOLBAR, true, true);
                        ctx.position_toolbar(LINK_TOOLBAR, PositionRequest::last());
                        ctx.close_toolbars(&[LINK_TOOLBAR], false);

                        if let Some(input) = control(ctx, LINK_TOOLBAR, INPUT) {
                            ctx.host().set_value(&input, "");
                            ctx.host().focus(&input);
                        }
                        if let Some(checkbox) = control(ctx, LINK_TOOLBAR, NEW_WINDOW) {
                            ctx.host().set_checked(&checkbox, false);
                        }
                        ctx.with_toolbar(LINK_TOOLBAR, |tb, host| tb.disable(host, DELETE, true));
                    }),
            );
        })
        .on(EventKind::Editor(InteractionKind::MouseUp), |ctx, event| {
            let Some(editor) = event.editor().cloned() else {
                return;
            };
            if !ctx.toolbars().has(LINK_TOOLBAR) {
                return;
            }
            let current = ctx.current_selection(&editor);
            let Some(anchor) = current.element.filter(|_| current.tag_name == "a") else {
                return;
            };

            ctx.close_toolbar(&editor, true);
            ctx.save_selection(&editor, false);
            ctx.open_toolbar(LINK_TOOLBAR, true, false);
            ctx.position_toolbar(LINK_TOOLBAR, PositionRequest::default());
            ctx.with_toolbar(LINK_TOOLBAR, |tb, host| tb.enable(host, DELETE));

            let host = ctx.host();
            if let Some(input) = control(ctx, LINK_TOOLBAR, INPUT) {
                host.set_value(&input, &host.attribute(&anchor, "href").unwrap_or_default());
                host.focus(&input);
            }
            if let Some(checkbox) = control(ctx, LINK_TOOLBAR, NEW_WINDOW) {
                host.set_checked(&checkbox, host.attribute(&anchor, "target").is_some());
            }
        })
        .on(EventKind::ToolbarClosed, |ctx, event| {
            if event.toolbar().is_some_and(|t| t == LINK_TOOLBAR)
                && let Some(editor) = ctx.active_editor_id()
            {
                ctx.clear_selection(&editor);
            }
        })
}
