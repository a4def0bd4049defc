//! Built-in feature plugins.
//!
//! Register them in order with [`EditorContext::plugins`]: `basic` provides
//! the shared `back` and separator templates the sub-toolbars of `links` and
//! `table` are built from.

mod basic;
mod clear;
mod html;
mod links;
mod styles;
mod table;

pub use basic::{HEADINGS_TOOLBAR, basic};
pub use clear::clear;
pub use html::html;
pub use links::{LINK_TOOLBAR, links};
pub use styles::{StyleSet, styles};
pub use table::{TABLE_TOOLBAR, table};

use smol_str::SmolStr;

use crate::context::EditorContext;
use crate::host::EditingHost;
use crate::plugin::Plugin;

/// The default plugin set, in registration order. Style selects are added
/// separately through [`styles`].
pub fn defaults<H: EditingHost>() -> Vec<Plugin<H>> {
    vec![basic(), html(), clear(), links(), table()]
}

fn keys(keys: &[&str]) -> Vec<SmolStr> {
    keys.iter().copied().map(SmolStr::new).collect()
}

/// Create a plugin's sub-toolbar once and build it from `items`.
fn sub_toolbar<H: EditingHost>(ctx: &mut EditorContext<H>, id: &str, items: &[&str]) -> bool {
    if ctx.toolbars().has(id) {
        return false;
    }
    if let Err(e) = ctx.create_toolbar(Some(id.into())) {
        tracing::warn!(target: "quire::plugin", toolbar = id, error = %e, "failed to create toolbar");
        return false;
    }
    ctx.build_toolbar(id, Some(keys(items)), Default::default());
    true
}

/// Element bound to `key` in `toolbar`.
fn control<H: EditingHost>(ctx: &EditorContext<H>, toolbar: &str, key: &str) -> Option<H::Node> {
    ctx.toolbar(toolbar)?.item_element(key)
}

fn control_value<H: EditingHost>(ctx: &EditorContext<H>, toolbar: &str, key: &str) -> String {
    control(ctx, toolbar, key)
        .and_then(|el| ctx.host().value(&el))
        .unwrap_or_default()
}
