//! Class pickers: each style set becomes a select item that applies one of
//! its option classes to the selection.

use std::fmt;
use std::rc::Rc;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use smol_str::SmolStr;

use super::control;
use crate::context::EditorContext;
use crate::event::{EditorEvent, EventKind};
use crate::host::EditingHost;
use crate::html::{write_attribute, write_text};
use crate::plugin::Plugin;
use crate::toolbar::{ItemTrigger, ToolbarItem};

/// Attribute on a style select remembering the class it last applied.
const APPLIED_ATTRIBUTE: &str = "data-class";

/// A named group of classes offered as one select.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StyleSet {
    pub key: SmolStr,
    #[serde(default)]
    pub title: String,
    /// `(label, class)` pairs in display order. An empty class means "none".
    #[serde(deserialize_with = "ordered_options")]
    pub options: Vec<(String, String)>,
    #[serde(default, alias = "optionToClass")]
    pub option_to_class: bool,
}

impl StyleSet {
    pub fn new<I, L, V>(key: impl Into<SmolStr>, title: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            title: title.into(),
            options: options
                .into_iter()
                .map(|(l, v)| (l.into(), v.into()))
                .collect(),
            option_to_class: false,
        }
    }

    pub fn with_option_to_class(mut self, enabled: bool) -> Self {
        self.option_to_class = enabled;
        self
    }
}

/// Options may be given as an object (`{"label": "class"}`, kept in source
/// order) or as a list of `[label, class]` pairs.
fn ordered_options<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, String)>, D::Error> {
    struct OptionsVisitor;

    impl<'de> Visitor<'de> for OptionsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map or a list of label/class pairs")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut options = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, String>()? {
                options.push(entry);
            }
            Ok(options)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut options = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(entry) = seq.next_element::<(String, String)>()? {
                options.push(entry);
            }
            Ok(options)
        }
    }

    deserializer.deserialize_any(OptionsVisitor)
}

fn classes(value: &str) -> impl Iterator<Item = &str> {
    value.split_whitespace()
}

/// Apply the chosen class to the element fully enclosing the selection, or
/// wrap the selection in a classed span when no element encloses it.
fn apply_style<H: EditingHost>(ctx: &mut EditorContext<H>, trigger: &ItemTrigger<H::Node>) {
    let value = trigger.value.clone().unwrap_or_default();
    let Some(select) = control(ctx, &trigger.toolbar, &trigger.item) else {
        return;
    };
    let host = ctx.host();
    let root = trigger
        .editor
        .as_deref()
        .and_then(|id| ctx.editor(id))
        .map(|e| e.root().clone());
    let enclosed = host.enclosed_element().filter(|el| Some(el) != root.as_ref());

    match enclosed {
        Some(el) => match host.attribute(&select, APPLIED_ATTRIBUTE) {
            Some(previous) => {
                for class in classes(&previous) {
                    host.remove_class(&el, class);
                }
                for class in classes(&value) {
                    host.add_class(&el, class);
                }
                if host.attribute(&el, "class").is_some_and(|c| c.trim().is_empty()) {
                    host.remove_attribute(&el, "class");
                }
            }
            None => {
                for class in classes(&value) {
                    host.add_class(&el, class);
                }
            }
        },
        None => {
            let text = host.selection().map(|s| s.text).unwrap_or_default();
            let mut markup = String::from(r#"<span class=""#);
            write_attribute(&mut markup, &value);
            markup.push_str(r#"">"#);
            write_text(&mut markup, &text);
            markup.push_str("</span>");
            if let Err(e) = host.exec_command("insertHTML", Some(&markup)) {
                tracing::warn!(target: "quire::plugin", error = %e, "failed to wrap selection in style span");
            }
        }
    }

    tracing::debug!(target: "quire::plugin", style = %trigger.item, class = %value, "applied style");
    host.set_attribute(&select, APPLIED_ATTRIBUTE, &value);
}

/// Point each style select of an opened toolbar at the option the current
/// element carries.
fn sync_selects<H: EditingHost>(ctx: &EditorContext<H>, sets: &[StyleSet], toolbar: &str) {
    let element = ctx
        .active_editor_id()
        .and_then(|id| ctx.current_selection(&id).element);
    let host = ctx.host();
    for set in sets {
        let Some(select) = control(ctx, toolbar, &set.key) else {
            continue;
        };
        let current = set
            .options
            .iter()
            .map(|(_, class)| class.as_str())
            .find(|class| {
                !class.is_empty()
                    && element
                        .as_ref()
                        .is_some_and(|el| classes(class).all(|c| host.has_class(el, c)))
            })
            .unwrap_or("");
        host.set_value(&select, current);
    }
}

/// Plugin adding one select item per style set.
pub fn styles<H: EditingHost>(sets: impl IntoIterator<Item = StyleSet>) -> Plugin<H> {
    let sets: Rc<[StyleSet]> = sets.into_iter().collect();
    let opened = Rc::clone(&sets);

    Plugin::<H>::new("styles")
        .on(EventKind::EditorsInit, move |ctx, _| {
            for set in sets.iter() {
                ctx.add_template(
                    ToolbarItem::<H>::select(set.key.clone())
                        .title(set.title.clone())
                        .attribute("data-style", "true")
                        .options(set.options.iter().cloned())
                        .option_to_class(set.option_to_class)
                        .on_change(apply_style::<H>),
                );
            }
        })
        .on(EventKind::ToolbarOpened, move |ctx, event| {
            if let EditorEvent::ToolbarOpened { toolbar } = event {
                sync_selects(ctx, &opened, toolbar);
            }
        })
}
