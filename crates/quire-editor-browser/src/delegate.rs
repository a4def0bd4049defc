//! Document-level event delegation.
//!
//! One listener per event type sits on the document and routes to the
//! editor surface or toolbar item the event landed in. The context lives in
//! an `Rc<RefCell<_>>`; DOM events raised synchronously while a handler
//! holds the borrow (focus changes, `execCommand` side effects) are dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use quire_editor_core::{EditingHost, EditorContext, EditorId, InteractionKind, KeyupSchedule};
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent};

use crate::events::{in_toolbar, interaction, target_element, toolbar_item};
use crate::host::BrowserHost;

pub type SharedContext = Rc<RefCell<EditorContext<BrowserHost>>>;

type PendingKeyups = Rc<RefCell<HashMap<(String, String), Timeout>>>;

/// Editor surface containing `target`.
fn editor_for(ctx: &EditorContext<BrowserHost>, target: &Element) -> Option<EditorId> {
    let host = ctx.host();
    ctx.editors()
        .all()
        .iter()
        .find(|e| host.contains(e.root(), target))
        .map(|e| e.id().clone())
}

/// Form controls keep their default mousedown so they can take focus.
fn is_form_control(el: &Element) -> bool {
    matches!(
        el.tag_name().to_ascii_lowercase().as_str(),
        "input" | "select" | "textarea" | "label" | "option"
    )
}

/// Run `f` against the context unless a handler is already running.
fn with_context(ctx: &SharedContext, event: &str, f: impl FnOnce(&mut EditorContext<BrowserHost>)) {
    match ctx.try_borrow_mut() {
        Ok(mut ctx) => f(&mut ctx),
        Err(_) => tracing::trace!(target: "quire::browser", event, "dropped re-entrant event"),
    }
}

fn schedule_keyup(ctx: &SharedContext, pending: &PendingKeyups, schedule: KeyupSchedule) {
    let key = (schedule.toolbar.to_string(), schedule.item.to_string());
    let flush_ctx = Rc::clone(ctx);
    let flush_pending = Rc::clone(pending);
    let flush_key = key.clone();
    let timeout = Timeout::new(schedule.delay.as_millis() as u32, move || {
        flush_pending.borrow_mut().remove(&flush_key);
        with_context(&flush_ctx, "keyup.flush", |ctx| {
            ctx.flush_keyup(&schedule.toolbar, &schedule.item, schedule.ticket);
        });
    });
    // Replacing the entry drops and cancels the superseded timer.
    pending.borrow_mut().insert(key, timeout);
}

/// Editors bound to the live document.
pub struct DomEditors {
    ctx: SharedContext,
    pending: PendingKeyups,
    listeners: Vec<EventListener>,
}

impl std::fmt::Debug for DomEditors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomEditors")
            .field("listeners", &self.listeners.len())
            .field("pending_keyups", &self.pending.borrow().len())
            .finish()
    }
}

impl DomEditors {
    /// Take ownership of `ctx` and start listening on its document.
    pub fn attach(ctx: EditorContext<BrowserHost>) -> Self {
        let document = ctx.host().document().clone();
        let ctx: SharedContext = Rc::new(RefCell::new(ctx));
        let pending = PendingKeyups::default();
        let mut listeners = Vec::new();
        let options = EventListenerOptions::enable_prevent_default();

        {
            let ctx = Rc::clone(&ctx);
            listeners.push(EventListener::new_with_options(&document, "mousedown", options, move |event| {
                let Some(target) = target_element(event) else {
                    return;
                };
                if in_toolbar(&target) {
                    // Keep the editor selection while a toolbar button is pressed.
                    if !is_form_control(&target) {
                        event.prevent_default();
                    }
                    return;
                }
                with_context(&ctx, "mousedown", |ctx| {
                    if let Some(editor) = editor_for(ctx, &target) {
                        ctx.handle_interaction(&editor, interaction(InteractionKind::MouseDown, event));
                    }
                });
            }));
        }

        for (name, kind) in [
            ("mouseup", InteractionKind::MouseUp),
            ("keydown", InteractionKind::KeyDown),
            ("keypress", InteractionKind::KeyPress),
            ("focusin", InteractionKind::Focus),
            ("focusout", InteractionKind::Blur),
        ] {
            let ctx = Rc::clone(&ctx);
            listeners.push(EventListener::new_with_options(&document, name, options, move |event| {
                let Some(target) = target_element(event) else {
                    return;
                };
                with_context(&ctx, name, |ctx| {
                    let Some(editor) = editor_for(ctx, &target) else {
                        return;
                    };
                    let outcome = ctx.handle_interaction(&editor, interaction(kind, event));
                    if outcome.prevent_default {
                        event.prevent_default();
                    }
                });
            }));
        }

        {
            let ctx = Rc::clone(&ctx);
            listeners.push(EventListener::new(&document, "click", move |event| {
                let target = target_element(event);
                with_context(&ctx, "click", |ctx| {
                    if let Some(target) = &target {
                        if let Some((toolbar, key)) = toolbar_item(target) {
                            ctx.item_click(&toolbar, &key, Some(interaction(InteractionKind::Click, event)));
                        } else if let Some(editor) = editor_for(ctx, target) {
                            ctx.handle_interaction(&editor, interaction(InteractionKind::Click, event));
                        }
                    }
                    ctx.handle_outside_click(target.as_ref());
                });
            }));
        }

        {
            let ctx = Rc::clone(&ctx);
            listeners.push(EventListener::new(&document, "change", move |event| {
                let Some((toolbar, key)) = target_element(event).and_then(|t| toolbar_item(&t)) else {
                    return;
                };
                with_context(&ctx, "change", |ctx| ctx.item_change(&toolbar, &key));
            }));
        }

        {
            let ctx = Rc::clone(&ctx);
            let pending = Rc::clone(&pending);
            listeners.push(EventListener::new(&document, "keyup", move |event| {
                let Some(target) = target_element(event) else {
                    return;
                };
                let mut schedule = None;
                with_context(&ctx, "keyup", |ctx| {
                    if let Some((toolbar, key)) = toolbar_item(&target) {
                        let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
                            return;
                        };
                        schedule = ctx.item_keyup(
                            &toolbar,
                            &key,
                            Some(crate::events::key_interaction(InteractionKind::KeyUp, keyboard)),
                        );
                    } else if let Some(editor) = editor_for(ctx, &target) {
                        ctx.handle_interaction(&editor, interaction(InteractionKind::KeyUp, event));
                    }
                });
                if let Some(schedule) = schedule {
                    schedule_keyup(&ctx, &pending, schedule);
                }
            }));
        }

        tracing::debug!(target: "quire::browser", listeners = listeners.len(), "attached document listeners");
        Self {
            ctx,
            pending,
            listeners,
        }
    }

    pub fn context(&self) -> &SharedContext {
        &self.ctx
    }

    /// Run `f` against the context. `None` while a handler is running.
    pub fn with<R>(&self, f: impl FnOnce(&mut EditorContext<BrowserHost>) -> R) -> Option<R> {
        let mut ctx = self.ctx.try_borrow_mut().ok()?;
        Some(f(&mut ctx))
    }

    /// Whether a DOM event is currently routed to a handler.
    pub fn is_busy(&self) -> bool {
        self.ctx.try_borrow_mut().is_err()
    }
}
