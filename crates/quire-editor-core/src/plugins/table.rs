//! Table insertion and the row/column sub-toolbar.

use super::sub_toolbar;
use crate::context::EditorContext;
use crate::event::{EditorEvent, EventKind};
use crate::host::{EditingHost, ElementSpec};
use crate::html::escape_html;
use crate::interaction::InteractionKind;
use crate::plugin::Plugin;
use crate::toolbar::{ItemTrigger, PositionRequest, ToolbarItem};

pub const TABLE_TOOLBAR: &str = "table";

const INSERT_ITEM: &str = "tables";
const ROW_DELETE: &str = "table.row.delete";
const COL_DELETE: &str = "table.col.delete";

const ROW_BELOW_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><path d="M0,0v40h100V0H0ZM90,10v20h-20V10h20ZM60,10v20h-20V10h20ZM30,10v20H10V10h20ZM30.91,74.55h15.27v-30.55h6.36v30.55h16.55l-19.09,25.45-19.09-25.45Z"/></svg>"#;
const ROW_ABOVE_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><path d="M100,100v-40H0v40h100ZM10,90v-20h20v20H10ZM40,90v-20h20v20h-20ZM70,90v-20h20v20h-20ZM69.09,25.45h-15.27v30.55h-6.36v-30.55h-16.55L50,0l19.09,25.45Z"/></svg>"#;
const COL_LEFT_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><path d="M100,0h-40v100h40V0ZM90,90h-20v-20h20v20ZM90,60h-20v-20h20v20ZM90,30h-20V10h20v20ZM25.45,30.91v15.27h30.55v6.36h-30.55v16.55L0,50l25.45-19.09Z"/></svg>"#;
const COL_RIGHT_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><path d="M0,100h40V0H0v100ZM10,10h20v20H10V10ZM10,40h20v20H10v-20ZM10,70h20v20H10v-20ZM74.55,69.09v-15.27h-30.55v-6.36h30.55v-16.55l25.45,19.09-25.45,19.09Z"/></svg>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnEdit {
    Left,
    Right,
    Delete,
}

/// The cell holding the editor's saved selection.
fn saved_cell<H: EditingHost>(ctx: &EditorContext<H>, trigger: &ItemTrigger<H::Node>) -> Option<H::Node> {
    let saved = ctx.saved_selection(trigger.editor.as_deref()?)?;
    ctx.host().closest(&saved.element?, "td")
}

fn cells<H: EditingHost>(host: &H, row: &H::Node) -> Vec<H::Node> {
    host.children(row)
        .into_iter()
        .filter(|c| host.tag_name(c) == "td")
        .collect()
}

fn insert_row<H: EditingHost>(ctx: &mut EditorContext<H>, trigger: &ItemTrigger<H::Node>, above: bool) {
    let host = ctx.host();
    let Some(row) = saved_cell(ctx, trigger).and_then(|td| host.closest(&td, "tr")) else {
        return;
    };
    let spec = ElementSpec::new("tr").with_html("<td></td>".repeat(cells(host, &row).len()));
    let inserted = host.create_element(&spec).and_then(|tr| {
        if above {
            host.insert_before(&row, &tr)
        } else {
            host.insert_after(&row, &tr)
        }
    });
    if let Err(e) = inserted {
        tracing::warn!(target: "quire::plugin", error = %e, "failed to insert row");
    }
    ctx.close_toolbar(&trigger.toolbar, true);
}

fn edit_column<H: EditingHost>(ctx: &mut EditorContext<H>, trigger: &ItemTrigger<H::Node>, edit: ColumnEdit) {
    let host = ctx.host();
    let Some(cell) = saved_cell(ctx, trigger) else {
        return;
    };
    let (Some(table), Some(index)) = (host.closest(&cell, "table"), host.element_index(&cell)) else {
        return;
    };

    for row in host.descendants_with_tag(&table, "tr") {
        let Some(target) = cells(host, &row).into_iter().nth(index) else {
            continue;
        };
        let result = match edit {
            ColumnEdit::Left => host
                .create_element(&ElementSpec::new("td"))
                .and_then(|td| host.insert_before(&target, &td)),
            ColumnEdit::Right => host
                .create_element(&ElementSpec::new("td"))
                .and_then(|td| host.insert_after(&target, &td)),
            ColumnEdit::Delete => host.remove_node(&target),
        };
        if let Err(e) = result {
            tracing::warn!(target: "quire::plugin", ?edit, error = %e, "failed to edit column");
        }
    }
    ctx.close_toolbar(&trigger.toolbar, true);
}

fn templates<H: EditingHost>() -> Vec<ToolbarItem<H>> {
    vec![
        ToolbarItem::<H>::button("table.row.below")
            .html(ROW_BELOW_ICON)
            .title("Add row below")
            .build_default(false)
            .on_click(|ctx, trigger| insert_row(ctx, trigger, false)),
        ToolbarItem::<H>::button("table.row.above")
            .html(ROW_ABOVE_ICON)
            .title("Add row above")
            .build_default(false)
            .on_click(|ctx, trigger| insert_row(ctx, trigger, true)),
        ToolbarItem::<H>::button(ROW_DELETE)
            .html("&#10008;")
            .title("Delete row")
            .build_default(false)
            .on_click(|ctx, trigger| {
                let host = ctx.host();
                if let Some(row) = saved_cell(ctx, trigger).and_then(|td| host.closest(&td, "tr"))
                    && let Err(e) = host.remove_node(&row)
                {
                    tracing::warn!(target: "quire::plugin", error = %e, "failed to delete row");
                }
                ctx.close_toolbar(&trigger.toolbar, true);
            }),
        ToolbarItem::<H>::button("table.col.left")
            .html(COL_LEFT_ICON)
            .title("Add column left")
            .build_default(false)
            .on_click(|ctx, trigger| edit_column(ctx, trigger, ColumnEdit::Left)),
        ToolbarItem::<H>::button("table.col.right")
            .html(COL_RIGHT_ICON)
            .title("Add column right")
            .build_default(false)
            .on_click(|ctx, trigger| edit_column(ctx, trigger, ColumnEdit::Right)),
        ToolbarItem::<H>::button(COL_DELETE)
            .html("&#10008;")
            .title("Delete column")
            .build_default(false)
            .on_click(|ctx, trigger| edit_column(ctx, trigger, ColumnEdit::Delete)),
        ToolbarItem::<H>::button("table.delete")
            .html("&#10008; &#9638;")
            .title("Delete table")
            .build_default(false)
            .on_click(|ctx, trigger| {
                let host = ctx.host();
                if let Some(table) = saved_cell(ctx, trigger).and_then(|td| host.closest(&td, "table"))
                    && let Err(e) = host.remove_node(&table)
                {
                    tracing::warn!(target: "quire::plugin", error = %e, "failed to delete table");
                }
                ctx.close_toolbar(&trigger.toolbar, true);
            }),
    ]
}

pub fn table<H: EditingHost>() -> Plugin<H> {
    Plugin::<H>::new("table")
        .on(EventKind::EditorsInit, |ctx, _| {
            ctx.add_template(
                ToolbarItem::<H>::button(INSERT_ITEM)
                    .title("Table")
                    .html("&#9638;")
                    .tag_name("table")
                    .on_click(|ctx, trigger| {
                        let text = trigger
                            .editor
                            .as_deref()
                            .map(|editor| ctx.current_selection(editor).text)
                            .unwrap_or_default();
                        let markup = format!(
                            "<table><tr><td>{}</td><td></td></tr></table>",
                            escape_html(&text)
                        );
                        if let Err(e) = ctx.host().exec_command("insertHTML", Some(&markup)) {
                            tracing::warn!(target: "quire::plugin", error = %e, "failed to insert table");
                        }
                        ctx.close_toolbar(&trigger.toolbar, true);
                    }),
            );

            if !ctx.toolbars().has(TABLE_TOOLBAR) {
                for item in templates() {
                    ctx.add_template(item);
                }
                sub_toolbar(
                    ctx,
                    TABLE_TOOLBAR,
                    &[
                        "back", "table.delete", "_", "table.row.below", "table.row.above",
                        ROW_DELETE, "_", "table.col.left", "table.col.right", COL_DELETE,
                    ],
                );
            }
        })
        .on(EventKind::Editor(InteractionKind::Click), |ctx, event| {
            let EditorEvent::Interaction {
                editor,
                interaction,
            } = event
            else {
                return;
            };
            let host = ctx.host();
            let Some(cell) = interaction.target.clone().filter(|t| host.tag_name(t) == "td") else {
                return;
            };
            if ctx.current_selection(editor).has_text() {
                return;
            }
            let Some(table) = host.closest(&cell, "table") else {
                return;
            };
            let rows = host.descendants_with_tag(&table, "tr");
            let row_count = rows.len();
            let col_count = rows.first().map(|r| cells(host, r).len()).unwrap_or(0);
            let (editor, page) = (editor.clone(), interaction.page);

            ctx.open_toolbar(TABLE_TOOLBAR, false, true);
            ctx.position_toolbar(TABLE_TOOLBAR, PositionRequest::at_pointer(page));
            ctx.save_selection(&editor, false);
            ctx.with_toolbar(TABLE_TOOLBAR, |tb, host| {
                if row_count <= 1 {
                    tb.disable(host, ROW_DELETE, true);
                } else {
                    tb.enable(host, ROW_DELETE);
                }
                if col_count <= 1 {
                    tb.disable(host, COL_DELETE, true);
                } else {
                    tb.enable(host, COL_DELETE);
                }
            });
        })
        .on(EventKind::Editor(InteractionKind::MouseUp), |ctx, event| {
            let Some(editor) = event.editor().cloned() else {
                return;
            };
            let Some(e) = ctx.editor(&editor) else {
                return;
            };
            let in_table = e
                .selection()
                .enclosing_tag_names(ctx.host())
                .iter()
                .any(|tag| tag == "table");
            let source_mode = e.is_source_mode();
            ctx.with_toolbar(&editor, |tb, host| {
                if in_table {
                    tb.disable(host, INSERT_ITEM, true);
                } else if !source_mode {
                    tb.enable(host, INSERT_ITEM);
                }
            });
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::interaction::Interaction;
    use crate::memory::{MemoryHost, NodeRef};
    use crate::plugins::basic;

    const GRID: &str = "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>";

    fn setup(html: &str) -> (EditorContext<MemoryHost>, NodeRef) {
        let mut ctx = EditorContext::new(MemoryHost::new());
        ctx.plugins([basic(), table()]);
        ctx.init();
        let root = ctx.host().mount(html);
        ctx.create_editor(root.clone(), EditorConfig::default().with_id("e").with_toolbar([INSERT_ITEM]))
            .unwrap();
        ctx.set_active_editor("e");
        (ctx, root)
    }

    /// Click into the `n`th cell so the table toolbar opens for it.
    fn click_cell(ctx: &mut EditorContext<MemoryHost>, root: &NodeRef, n: usize) {
        let cell = ctx.host().descendants_with_tag(root, "td")[n].clone();
        ctx.host().select_text(&cell, 0, 0);
        ctx.handle_interaction("e", Interaction::new(InteractionKind::Click).with_target(cell));
    }

    #[test]
    fn test_insert_table_with_selected_text() {
        let (mut ctx, root) = setup("<p>cell</p>");
        let p = ctx.host().first_with_tag(&root, "p").unwrap();
        ctx.host().select_text(&p, 0, 4);
        ctx.item_click("e", INSERT_ITEM, None);
        insta::assert_snapshot!(
            ctx.host().inner_html(&root),
            @"<p><table><tr><td>cell</td><td></td></tr></table></p>"
        );
    }

    #[test]
    fn test_click_in_cell_opens_toolbar() {
        let (mut ctx, root) = setup(GRID);
        click_cell(&mut ctx, &root, 0);
        let toolbar = ctx.toolbar(TABLE_TOOLBAR).unwrap();
        assert!(toolbar.is_open());
        assert!(!toolbar.get(ROW_DELETE).unwrap().disabled);
        assert!(!toolbar.get(COL_DELETE).unwrap().disabled);
    }

    #[test]
    fn test_single_cell_disables_deletes() {
        let (mut ctx, root) = setup("<table><tr><td>only</td></tr></table>");
        click_cell(&mut ctx, &root, 0);
        let toolbar = ctx.toolbar(TABLE_TOOLBAR).unwrap();
        assert!(toolbar.get(ROW_DELETE).unwrap().disabled);
        assert!(toolbar.get(COL_DELETE).unwrap().disabled);
    }

    #[test]
    fn test_row_operations() {
        let (mut ctx, root) = setup(GRID);
        click_cell(&mut ctx, &root, 0);
        ctx.item_click(TABLE_TOOLBAR, "table.row.below", None);
        insta::assert_snapshot!(
            ctx.host().inner_html(&root),
            @"<table><tr><td>a</td><td>b</td></tr><tr><td></td><td></td></tr><tr><td>c</td><td>d</td></tr></table>"
        );

        click_cell(&mut ctx, &root, 0);
        ctx.item_click(TABLE_TOOLBAR, "table.row.above", None);
        click_cell(&mut ctx, &root, 2);
        ctx.item_click(TABLE_TOOLBAR, ROW_DELETE, None);
        insta::assert_snapshot!(
            ctx.host().inner_html(&root),
            @"<table><tr><td></td><td></td></tr><tr><td></td><td></td></tr><tr><td>c</td><td>d</td></tr></table>"
        );
    }

    #[test]
    fn test_column_operations() {
        let (mut ctx, root) = setup(GRID);
        click_cell(&mut ctx, &root, 1);
        ctx.item_click(TABLE_TOOLBAR, "table.col.left", None);
        insta::assert_snapshot!(
            ctx.host().inner_html(&root),
            @"<table><tr><td>a</td><td></td><td>b</td></tr><tr><td>c</td><td></td><td>d</td></tr></table>"
        );

        click_cell(&mut ctx, &root, 0);
        ctx.item_click(TABLE_TOOLBAR, COL_DELETE, None);
        insta::assert_snapshot!(
            ctx.host().inner_html(&root),
            @"<table><tr><td></td><td>b</td></tr><tr><td></td><td>d</td></tr></table>"
        );

        click_cell(&mut ctx, &root, 1);
        ctx.item_click(TABLE_TOOLBAR, "table.col.right", None);
        insta::assert_snapshot!(
            ctx.host().inner_html(&root),
            @"<table><tr><td></td><td>b</td><td></td></tr><tr><td></td><td>d</td><td></td></tr></table>"
        );
    }

    #[test]
    fn test_delete_table() {
        let (mut ctx, root) = setup(&format!("<p>x</p>{GRID}"));
        click_cell(&mut ctx, &root, 3);
        ctx.item_click(TABLE_TOOLBAR, "table.delete", None);
        insta::assert_snapshot!(ctx.host().inner_html(&root), @"<p>x</p>");
    }

    #[test]
    fn test_insert_item_disabled_inside_table() {
        let (mut ctx, root) = setup(&format!("<p>x</p>{GRID}"));
        let cell = ctx.host().first_with_tag(&root, "td").unwrap();
        ctx.host().select_text(&cell, 0, 0);
        ctx.handle_interaction("e", Interaction::new(InteractionKind::MouseUp));
        assert!(ctx.toolbar("e").unwrap().get(INSERT_ITEM).unwrap().disabled);

        let p = ctx.host().first_with_tag(&root, "p").unwrap();
        ctx.host().select_text(&p, 0, 0);
        ctx.handle_interaction("e", Interaction::new(InteractionKind::MouseUp));
        assert!(!ctx.toolbar("e").unwrap().get(INSERT_ITEM).unwrap().disabled);
    }
}
