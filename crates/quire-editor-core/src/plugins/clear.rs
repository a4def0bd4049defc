use crate::event::EventKind;
use crate::host::EditingHost;
use crate::plugin::Plugin;
use crate::toolbar::ToolbarItem;

/// `clear` item emptying the surface and its shadow field.
pub fn clear<H: EditingHost>() -> Plugin<H> {
    Plugin::<H>::new("clear").on(EventKind::EditorsInit, |ctx, _| {
        ctx.add_template(ToolbarItem::<H>::button("clear").title("clear").html("clear").on_click(
            |ctx, trigger| {
                let Some(editor) = trigger.editor.as_deref().and_then(|id| ctx.editor(id)) else {
                    return;
                };
                let host = ctx.host();
                host.set_inner_html(editor.root(), "");
                if let Some(shadow) = editor.shadow() {
                    host.set_value(shadow, "");
                }
            },
        ));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::context::EditorContext;
    use crate::memory::MemoryHost;

    #[test]
    fn test_clear_empties_surface_and_shadow() {
        let mut ctx = EditorContext::new(MemoryHost::new());
        ctx.plugin(clear());
        ctx.init();
        let wrapper = ctx.host().mount(r#"<textarea name="notes">&lt;p&gt;draft&lt;/p&gt;</textarea>"#);
        let textarea = ctx.host().first_with_tag(&wrapper, "textarea").unwrap();
        let id = ctx
            .create_editor(textarea, EditorConfig::default().with_toolbar(["clear"]))
            .unwrap();
        ctx.set_active_editor(&id);

        ctx.item_click(&id, "clear", None);
        let editor = ctx.editor(&id).unwrap();
        assert_eq!(ctx.host().inner_html(editor.root()), "");
        assert_eq!(ctx.host().value(editor.shadow().unwrap()).as_deref(), Some(""));
    }
}
