//! Block formats, inline styles, lists, history and the headings sub-toolbar.

use super::sub_toolbar;
use crate::event::EventKind;
use crate::host::EditingHost;
use crate::interaction::InteractionKind;
use crate::plugin::Plugin;
use crate::toolbar::{Command, PositionRequest, ToolbarItem, Undo};

pub const HEADINGS_TOOLBAR: &str = "headings";

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

fn block<H: EditingHost>(key: &str, title: &str, html: &str, value: &str) -> ToolbarItem<H> {
    ToolbarItem::<H>::button(key)
        .title(title)
        .html(html)
        .command(Command::with_value("formatblock", value))
        .tag_name(key)
}

fn inline<H: EditingHost>(key: &str, title: &str, html: &str, command: &str, tag: &str) -> ToolbarItem<H> {
    ToolbarItem::<H>::button(key)
        .title(title)
        .html(html)
        .command(Command::new(command))
        .tag_name(tag)
        .undo(Undo::Unwrap)
}

fn templates<H: EditingHost>() -> Vec<ToolbarItem<H>> {
    let to_paragraph = Undo::Run(Command::with_value("formatblock", "<p>"));
    let mut items = vec![block("p", "Paragraph", "&#182;", "<p>")];
    for (n, tag) in HEADINGS.iter().enumerate() {
        items.push(
            block(tag, &tag.to_uppercase(), &format!("<b>H<sub>{}</sub></b>", n + 1), &format!("<{tag}>"))
                .undo(to_paragraph.clone()),
        );
    }

    items.extend([
        inline("bold", "Bold", "<b>B</b>", "bold", "b"),
        inline("italic", "Italic", "<i>I</i>", "italic", "i"),
        inline("underline", "Underline", "<u>U</u>", "underline", "u"),
        inline("strike", "Strike through", "<s>S</s>", "strikeThrough", "s"),
        ToolbarItem::<H>::button("ol")
            .title("Numbered list")
            .html("&#35;")
            .command(Command::new("insertorderedlist"))
            .tag_name("ol"),
        ToolbarItem::<H>::button("ul")
            .title("Dotted list")
            .html("&#8226;")
            .command(Command::new("insertunorderedlist"))
            .tag_name("ul"),
        ToolbarItem::<H>::button("quote")
            .title("Quote")
            .html("&#10077;")
            .command(Command::with_value("formatblock", "blockquote"))
            .tag_name("blockquote")
            .undo(Undo::Run(Command::new("outdent"))),
        block("pre", "Preformatted", "&lt;pre&gt;", "<pre>").undo(to_paragraph),
        ToolbarItem::<H>::button("code")
            .title("Code")
            .html("&lt;code&gt;")
            .tag_name("code"),
        ToolbarItem::<H>::button("undo")
            .title("Undo")
            .html("&#8617;")
            .command(Command::new("undo")),
        ToolbarItem::<H>::button("redo")
            .title("Redo")
            .html("&#8618;")
            .command(Command::new("redo")),
        ToolbarItem::<H>::span("|", "etb-sv"),
        ToolbarItem::<H>::span("||", "etb-sv-space"),
        ToolbarItem::<H>::span("_", "etb-sh"),
        ToolbarItem::<H>::span("__", "etb-sh-space"),
        ToolbarItem::<H>::button("back")
            .html("&#8592;")
            .build_default(false)
            .on_click(|ctx, trigger| {
                if let Some(last) = ctx.toolbars().last_id().cloned() {
                    ctx.open_toolbar(&last, true, true);
                }
                ctx.close_toolbar(&trigger.toolbar, true);
                if let Some(editor) = &trigger.editor {
                    ctx.clear_selection(editor);
                }
            }),
    ]);
    items
}

pub fn basic<H: EditingHost>() -> Plugin<H> {
    Plugin::<H>::new("basic")
        .on(EventKind::EditorsInit, |ctx, _| {
            for item in templates() {
                ctx.add_template(item);
            }

            let mut items = vec!["back"];
            items.extend(HEADINGS);
            sub_toolbar(ctx, HEADINGS_TOOLBAR, &items);

            ctx.add_template(
                ToolbarItem::<H>::button("headings")
                    .title("Headings")
                    .html("<b>H</b>")
                    .build_default(false)
                    .on_click(|ctx, trigger| {
                        let Some(editor) = &trigger.editor else {
                            return;
                        };
                        ctx.save_selection(editor, true);
                        ctx.open_toolbar(HEADINGS_TOOLBAR, true, true);
                        ctx.position_toolbar(HEADINGS_TOOLBAR, PositionRequest::last());
                        ctx.close_toolbars(&[HEADINGS_TOOLBAR], false);
                    }),
            );
        })
        .on(EventKind::Editor(InteractionKind::MouseUp), |ctx, event| {
            let Some(editor) = event.editor().cloned() else {
                return;
            };
            let in_heading = ctx.editor(&editor).is_some_and(|e| {
                e.selection()
                    .enclosing_tag_names(ctx.host())
                    .iter()
                    .any(|tag| HEADINGS.contains(&tag.as_str()))
            });
            if in_heading {
                ctx.with_toolbar(&editor, |tb, host| tb.set_active_item(host, "headings"));
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::context::EditorContext;
    use crate::interaction::Interaction;
    use crate::memory::MemoryHost;
    use crate::toolbar::OPEN_CLASS;

    fn setup(html: &str, toolbar: &[&str]) -> (EditorContext<MemoryHost>, crate::memory::NodeRef) {
        let mut ctx = EditorContext::new(MemoryHost::new());
        ctx.plugin(basic());
        ctx.init();
        let root = ctx.host().mount(html);
        ctx.create_editor(
            root.clone(),
            EditorConfig::default()
                .with_id("e")
                .with_toolbar(toolbar.iter().copied()),
        )
        .unwrap();
        ctx.set_active_editor("e");
        (ctx, root)
    }

    #[test]
    fn test_headings_toolbar_built() {
        let (ctx, _) = setup("", &["bold"]);
        let headings = ctx.toolbar(HEADINGS_TOOLBAR).unwrap();
        assert_eq!(headings.keys(), vec!["back", "h1", "h2", "h3", "h4", "h5", "h6"]);
    }

    #[test]
    fn test_default_build_skips_back_and_headings() {
        let mut ctx = EditorContext::new(MemoryHost::new());
        ctx.plugin(basic());
        ctx.init();
        let root = ctx.host().mount("");
        let id = ctx.create_editor(root, EditorConfig::default()).unwrap();
        let keys = ctx.toolbar(&id).unwrap().keys();
        assert!(keys.contains(&"bold".into()));
        assert!(keys.contains(&"h6".into()));
        assert!(!keys.contains(&"back".into()));
        assert!(!keys.contains(&"headings".into()));
        assert!(!keys.contains(&"|".into()));
    }

    #[test]
    fn test_bold_toggles() {
        let (mut ctx, root) = setup("<p>some text</p>", &["bold"]);
        let p = ctx.host().first_with_tag(&root, "p").unwrap();
        ctx.host().select_text(&p, 0, 4);

        ctx.item_click("e", "bold", None);
        insta::assert_snapshot!(ctx.host().inner_html(&root), @"<p><b>some</b> text</p>");
        assert!(ctx.toolbar("e").unwrap().get("bold").unwrap().active);

        let b = ctx.host().first_with_tag(&root, "b").unwrap();
        ctx.host().select_text(&b, 1, 1);
        ctx.item_click("e", "bold", None);
        insta::assert_snapshot!(ctx.host().inner_html(&root), @"<p>some text</p>");
    }

    #[test]
    fn test_heading_undo_formats_paragraph() {
        let (mut ctx, root) = setup("<h2>title</h2>", &["h2"]);
        let h2 = ctx.host().first_with_tag(&root, "h2").unwrap();
        ctx.host().select_text(&h2, 0, 5);
        ctx.open_toolbar("e", true, false);
        assert!(ctx.toolbar("e").unwrap().get("h2").unwrap().active);

        ctx.item_click("e", "h2", None);
        insta::assert_snapshot!(ctx.host().inner_html(&root), @"<p>title</p>");
    }

    #[test]
    fn test_headings_opens_sub_toolbar_and_back_returns() {
        let (mut ctx, root) = setup("<p>pick me</p>", &["bold", "headings"]);
        let p = ctx.host().first_with_tag(&root, "p").unwrap();
        ctx.host().select_text(&p, 0, 4);
        ctx.handle_interaction("e", Interaction::new(InteractionKind::MouseUp));
        assert!(ctx.toolbar("e").unwrap().is_open());

        ctx.item_click("e", "headings", None);
        assert!(ctx.toolbar(HEADINGS_TOOLBAR).unwrap().is_open());
        assert!(!ctx.toolbar("e").unwrap().is_open());
        insta::assert_snapshot!(ctx.host().inner_html(&root), @r#"<p><span data-marker="editor">pick</span> me</p>"#);

        ctx.item_click(HEADINGS_TOOLBAR, "back", None);
        assert!(ctx.toolbar("e").unwrap().is_open());
        let headings = ctx.toolbar(HEADINGS_TOOLBAR).unwrap();
        assert!(!headings.is_open());
        assert!(!ctx.host().has_class(headings.element(), OPEN_CLASS));
        insta::assert_snapshot!(ctx.host().inner_html(&root), @"<p>pick me</p>");
    }

    #[test]
    fn test_mouseup_in_heading_marks_headings_active() {
        let (mut ctx, root) = setup("<h3>x</h3>", &["headings"]);
        let h3 = ctx.host().first_with_tag(&root, "h3").unwrap();
        ctx.host().select_text(&h3, 0, 0);
        ctx.handle_interaction("e", Interaction::new(InteractionKind::MouseUp));
        assert!(ctx.toolbar("e").unwrap().get("headings").unwrap().active);
    }
}
