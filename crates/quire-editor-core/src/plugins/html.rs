//! Source view toggle.

use crate::event::EventKind;
use crate::host::EditingHost;
use crate::interaction::InteractionKind;
use crate::plugin::Plugin;
use crate::toolbar::{MatchField, ToolbarItem};

const SOURCE_ITEM: &str = "sourcecode";

pub fn html<H: EditingHost>() -> Plugin<H> {
    Plugin::<H>::new("html")
        .on(EventKind::EditorsInit, |ctx, _| {
            ctx.add_template(
                ToolbarItem::<H>::button(SOURCE_ITEM)
                    .title("Sourcecode")
                    .html("&lt;/&gt;")
                    .on_click(|ctx, trigger| {
                        let Some(editor) = &trigger.editor else {
                            return;
                        };
                        if ctx.editor(editor).is_some_and(|e| e.is_source_mode()) {
                            ctx.leave_source_mode(editor);
                        } else {
                            ctx.enter_source_mode(editor, &[SOURCE_ITEM]);
                        }
                    }),
            );
        })
        .on(EventKind::Editor(InteractionKind::MouseUp), |ctx, event| {
            let Some(editor) = event.editor().cloned() else {
                return;
            };
            if ctx.editor(&editor).is_some_and(|e| e.is_source_mode()) {
                ctx.with_toolbar(&editor, |tb, host| {
                    tb.set_active(host, &[SOURCE_ITEM.into()], MatchField::Key, true)
                });
            }
        })
}
