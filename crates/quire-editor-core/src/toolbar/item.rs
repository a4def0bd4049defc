//! Toolbar item descriptors.
//!
//! Items are registered as templates, cloned into toolbars when a toolbar is
//! built, and carry their own runtime state (active/disabled flags, bound
//! element) once added.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use smol_str::SmolStr;

use crate::context::EditorContext;
use crate::debounce::Debounced;
use crate::host::{EditingHost, ElementSpec};
use crate::interaction::Interaction;
use crate::types::{EditorId, ToolbarId};

/// Element an item renders as.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ElementKind {
    #[default]
    Button,
    Select,
    Input,
    Label,
    Span,
    Other(SmolStr),
}

impl ElementKind {
    pub fn tag(&self) -> &str {
        match self {
            Self::Button => "button",
            Self::Select => "select",
            Self::Input => "input",
            Self::Label => "label",
            Self::Span => "span",
            Self::Other(tag) => tag,
        }
    }

    /// Whether default builds include items of this kind.
    pub fn builds_by_default(&self) -> bool {
        matches!(self, Self::Button | Self::Select)
    }
}

/// A host command with an optional value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: SmolStr,
    pub value: Option<String>,
}

impl Command {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// What clicking an active item does.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Undo {
    /// Run the item's command again.
    #[default]
    Repeat,
    /// Unwrap the selected element when nothing is selected, otherwise run
    /// the command again.
    Unwrap,
    /// Run a different command.
    Run(Command),
}

/// Where an added item's element goes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Placement<N> {
    /// Append to the toolbar surface.
    #[default]
    Append,
    /// Insert directly after the item with this key.
    After(SmolStr),
    /// Append into a container element.
    Into(N),
}

/// Context handed to item handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTrigger<N> {
    pub toolbar: ToolbarId,
    pub item: SmolStr,
    /// The active editor when the item fired.
    pub editor: Option<EditorId>,
    pub interaction: Option<Interaction<N>>,
    /// Control value for change and keyup handlers.
    pub value: Option<String>,
}

/// Item click/change/keyup callback.
pub type ItemHandler<H> =
    Rc<dyn Fn(&mut EditorContext<H>, &ItemTrigger<<H as EditingHost>::Node>)>;

/// Parameters merged into every item of a build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemParams {
    /// Editor the toolbar is built for.
    pub editor: Option<EditorId>,
    /// Extra classes for every item element.
    pub classes: Vec<SmolStr>,
}

impl ItemParams {
    pub fn for_editor(editor: EditorId) -> Self {
        Self {
            editor: Some(editor),
            ..Default::default()
        }
    }
}

/// One toolbar control.
pub struct ToolbarItem<H: EditingHost> {
    /// Unique within a toolbar; generated on add when empty.
    pub key: SmolStr,
    pub kind: ElementKind,
    /// Element description; its tag is taken from `kind`.
    pub spec: ElementSpec,
    /// Untranslated title.
    pub title: Option<String>,
    pub command: Option<Command>,
    pub undo: Undo,
    /// Tag this item corresponds to for active-state sync.
    pub tag_name: Option<SmolStr>,
    pub build_default: bool,
    pub placement: Placement<H::Node>,
    pub editor: Option<EditorId>,
    pub click: Option<ItemHandler<H>>,
    pub change: Option<ItemHandler<H>>,
    pub keyup: Option<ItemHandler<H>>,

    pub active: bool,
    pub disabled: bool,
    pub el: Option<H::Node>,
    pub toolbar: Option<ToolbarId>,
    pub(crate) keyup_debounce: Debounced<ItemTrigger<H::Node>>,
}

impl<H: EditingHost> Clone for ToolbarItem<H> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            kind: self.kind.clone(),
            spec: self.spec.clone(),
            title: self.title.clone(),
            command: self.command.clone(),
            undo: self.undo.clone(),
            tag_name: self.tag_name.clone(),
            build_default: self.build_default,
            placement: self.placement.clone(),
            editor: self.editor.clone(),
            click: self.click.clone(),
            change: self.change.clone(),
            keyup: self.keyup.clone(),
            active: self.active,
            disabled: self.disabled,
            el: self.el.clone(),
            toolbar: self.toolbar.clone(),
            keyup_debounce: self.keyup_debounce.clone(),
        }
    }
}

impl<H: EditingHost> fmt::Debug for ToolbarItem<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolbarItem")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("command", &self.command)
            .field("undo", &self.undo)
            .field("tag_name", &self.tag_name)
            .field("active", &self.active)
            .field("disabled", &self.disabled)
            .field("el", &self.el)
            .finish_non_exhaustive()
    }
}

impl<H: EditingHost> ToolbarItem<H> {
    pub fn new(key: impl Into<SmolStr>, kind: ElementKind) -> Self {
        Self {
            key: key.into(),
            spec: ElementSpec::new(kind.tag()),
            kind,
            title: None,
            command: None,
            undo: Undo::Repeat,
            tag_name: None,
            build_default: true,
            placement: Placement::Append,
            editor: None,
            click: None,
            change: None,
            keyup: None,
            active: false,
            disabled: false,
            el: None,
            toolbar: None,
            keyup_debounce: Debounced::default(),
        }
    }

    pub fn button(key: impl Into<SmolStr>) -> Self {
        Self::new(key, ElementKind::Button)
    }

    pub fn select(key: impl Into<SmolStr>) -> Self {
        Self::new(key, ElementKind::Select)
    }

    pub fn input(key: impl Into<SmolStr>, input_type: impl Into<String>) -> Self {
        let mut item = Self::new(key, ElementKind::Input);
        item.spec.input_type = Some(input_type.into());
        item
    }

    pub fn label(key: impl Into<SmolStr>, target: impl Into<String>) -> Self {
        let mut item = Self::new(key, ElementKind::Label);
        item.spec.label_for = Some(target.into());
        item
    }

    /// A decorative `<span>` (separators).
    pub fn span(key: impl Into<SmolStr>, class: impl Into<SmolStr>) -> Self {
        Self::new(key, ElementKind::Span)
            .html("<!-- -->")
            .class(class)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.spec.html = Some(html.into());
        self
    }

    pub fn class(mut self, class: impl Into<SmolStr>) -> Self {
        self.spec.classes.push(class.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.spec.attributes.push((name.into(), value.into()));
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.spec.id = Some(id.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.spec.placeholder = Some(placeholder.into());
        self
    }

    pub fn options<I, L, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<String>,
    {
        self.spec.options = options
            .into_iter()
            .map(|(l, v)| (l.into(), v.into()))
            .collect();
        self
    }

    pub fn option_to_class(mut self, enabled: bool) -> Self {
        self.spec.option_to_class = enabled;
        self
    }

    pub fn command(mut self, command: Command) -> Self {
        self.command = Some(command);
        self
    }

    pub fn undo(mut self, undo: Undo) -> Self {
        self.undo = undo;
        self
    }

    pub fn tag_name(mut self, tag: impl Into<SmolStr>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    pub fn build_default(mut self, build_default: bool) -> Self {
        self.build_default = build_default;
        self
    }

    pub fn after(mut self, key: impl Into<SmolStr>) -> Self {
        self.placement = Placement::After(key.into());
        self
    }

    pub fn into_container(mut self, container: H::Node) -> Self {
        self.placement = Placement::Into(container);
        self
    }

    pub fn on_click(
        mut self,
        f: impl Fn(&mut EditorContext<H>, &ItemTrigger<H::Node>) + 'static,
    ) -> Self {
        self.click = Some(Rc::new(f));
        self
    }

    pub fn on_change(
        mut self,
        f: impl Fn(&mut EditorContext<H>, &ItemTrigger<H::Node>) + 'static,
    ) -> Self {
        self.change = Some(Rc::new(f));
        self
    }

    pub fn on_keyup(
        mut self,
        f: impl Fn(&mut EditorContext<H>, &ItemTrigger<H::Node>) + 'static,
    ) -> Self {
        self.keyup = Some(Rc::new(f));
        self
    }

    /// Included in builds without an explicit key list.
    pub fn is_default_build(&self) -> bool {
        self.build_default && self.kind.builds_by_default()
    }

    /// Whether `field` of this item is one of `values`.
    pub fn matches(&self, field: MatchField, values: &[SmolStr]) -> bool {
        match field {
            MatchField::Key => values.contains(&self.key),
            MatchField::TagName => self
                .tag_name
                .as_ref()
                .is_some_and(|tag| values.contains(tag)),
        }
    }

    /// The element description with the tag implied by `kind`.
    pub fn element_spec(&self) -> ElementSpec {
        let mut spec = self.spec.clone();
        spec.tag = SmolStr::new(self.kind.tag());
        spec
    }

    pub(crate) fn apply_params(&mut self, params: &ItemParams) {
        if params.editor.is_some() {
            self.editor = params.editor.clone();
        }
        self.spec.classes.extend(params.classes.iter().cloned());
    }

    pub(crate) fn set_debounce_interval(&mut self, interval: Duration) {
        self.keyup_debounce.set_interval(interval);
    }

    /// Drop runtime state so a template copy starts fresh.
    pub(crate) fn reset_state(&mut self) {
        self.active = false;
        self.disabled = false;
        self.el = None;
        self.toolbar = None;
        self.keyup_debounce.cancel();
    }
}

/// Which item field [`Toolbar::set_active`](super::Toolbar::set_active)
/// matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchField {
    #[default]
    Key,
    TagName,
}
