//! Lifecycle events and the listener bus.
//!
//! Listeners receive the whole [`EditorContext`] mutably, so they can open
//! toolbars, edit the document or register more listeners while an event is
//! being dispatched. The bus hands out cloned listener handles before
//! dispatch; listeners added during a dispatch see the next event.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use smol_str::SmolStr;

use crate::context::EditorContext;
use crate::host::EditingHost;
use crate::interaction::{Interaction, InteractionKind};
use crate::toolbar::{ItemParams, ToolbarItem};
use crate::types::{EditorId, ToolbarId};

/// Event names listeners subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    EditorsInit,
    EditorsRegistered,
    EditorCreated,
    EditorDestroyed,
    /// `editor.<interaction>`
    Editor(InteractionKind),
    ToolbarBuild,
    ToolbarOpened,
    ToolbarClosed,
    ToolbarsItem,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EditorsInit => "editors.init",
            Self::EditorsRegistered => "editors.registered",
            Self::EditorCreated => "editor.created",
            Self::EditorDestroyed => "editor.destroyed",
            Self::Editor(kind) => match kind {
                InteractionKind::MouseDown => "editor.mousedown",
                InteractionKind::MouseUp => "editor.mouseup",
                InteractionKind::Click => "editor.click",
                InteractionKind::KeyDown => "editor.keydown",
                InteractionKind::KeyPress => "editor.keypress",
                InteractionKind::KeyUp => "editor.keyup",
                InteractionKind::Blur => "editor.blur",
                InteractionKind::Focus => "editor.focus",
            },
            Self::ToolbarBuild => "toolbar.build",
            Self::ToolbarOpened => "toolbar.opened",
            Self::ToolbarClosed => "toolbar.closed",
            Self::ToolbarsItem => "toolbars.item",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown event name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown event: {0}")]
pub struct UnknownEvent(pub SmolStr);

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "editors.init" => Self::EditorsInit,
            "editors.registered" => Self::EditorsRegistered,
            "editor.created" => Self::EditorCreated,
            "editor.destroyed" => Self::EditorDestroyed,
            "toolbar.build" => Self::ToolbarBuild,
            "toolbar.opened" => Self::ToolbarOpened,
            "toolbar.closed" => Self::ToolbarClosed,
            "toolbars.item" => Self::ToolbarsItem,
            other => {
                let kind = other
                    .strip_prefix("editor.")
                    .and_then(|k| k.parse::<InteractionKind>().ok())
                    .ok_or_else(|| UnknownEvent(SmolStr::new(other)))?;
                Self::Editor(kind)
            }
        })
    }
}

/// Mutable request carried by `toolbar.build`.
///
/// Listeners may rewrite the key list or the shared parameters before the
/// toolbar resolves its items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildRequest {
    pub toolbar: ToolbarId,
    /// Item keys to build; `None` builds the default set.
    pub items: Option<Vec<SmolStr>>,
    pub params: ItemParams,
}

/// Event payloads.
pub enum EditorEvent<H: EditingHost> {
    EditorsInit,
    EditorsRegistered,
    EditorCreated {
        editor: EditorId,
    },
    EditorDestroyed {
        editor: EditorId,
    },
    Interaction {
        editor: EditorId,
        interaction: Interaction<H::Node>,
    },
    ToolbarBuild(BuildRequest),
    ToolbarOpened {
        toolbar: ToolbarId,
    },
    ToolbarClosed {
        toolbar: ToolbarId,
    },
    /// A template about to be stored; listeners may adjust it.
    ToolbarsItem(Box<ToolbarItem<H>>),
}

impl<H: EditingHost> EditorEvent<H> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::EditorsInit => EventKind::EditorsInit,
            Self::EditorsRegistered => EventKind::EditorsRegistered,
            Self::EditorCreated { .. } => EventKind::EditorCreated,
            Self::EditorDestroyed { .. } => EventKind::EditorDestroyed,
            Self::Interaction { interaction, .. } => EventKind::Editor(interaction.kind),
            Self::ToolbarBuild(_) => EventKind::ToolbarBuild,
            Self::ToolbarOpened { .. } => EventKind::ToolbarOpened,
            Self::ToolbarClosed { .. } => EventKind::ToolbarClosed,
            Self::ToolbarsItem(_) => EventKind::ToolbarsItem,
        }
    }

    /// The editor the event concerns, if any.
    pub fn editor(&self) -> Option<&EditorId> {
        match self {
            Self::EditorCreated { editor }
            | Self::EditorDestroyed { editor }
            | Self::Interaction { editor, .. } => Some(editor),
            _ => None,
        }
    }

    /// The toolbar the event concerns, if any.
    pub fn toolbar(&self) -> Option<&ToolbarId> {
        match self {
            Self::ToolbarOpened { toolbar } | Self::ToolbarClosed { toolbar } => Some(toolbar),
            Self::ToolbarBuild(request) => Some(&request.toolbar),
            _ => None,
        }
    }
}

impl<H: EditingHost> fmt::Debug for EditorEvent<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interaction {
                editor,
                interaction,
            } => f
                .debug_struct("Interaction")
                .field("editor", editor)
                .field("interaction", interaction)
                .finish(),
            Self::ToolbarBuild(request) => f.debug_tuple("ToolbarBuild").field(request).finish(),
            Self::ToolbarsItem(item) => f.debug_tuple("ToolbarsItem").field(&item.key).finish(),
            other => f
                .debug_struct(other.kind().as_str())
                .field("editor", &other.editor())
                .field("toolbar", &other.toolbar())
                .finish(),
        }
    }
}

/// A listener callback.
pub type Listener<H> = Rc<dyn Fn(&mut EditorContext<H>, &mut EditorEvent<H>)>;

/// Handle for removing a listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered listener registry.
pub struct EventBus<H: EditingHost> {
    next_id: u64,
    listeners: Vec<(ListenerId, EventKind, Listener<H>)>,
}

impl<H: EditingHost> Default for EventBus<H> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<H: EditingHost> fmt::Debug for EventBus<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.listeners.iter().map(|(id, kind, _)| (id, kind)))
            .finish()
    }
}

impl<H: EditingHost> EventBus<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(
        &mut self,
        kind: EventKind,
        listener: impl Fn(&mut EditorContext<H>, &mut EditorEvent<H>) + 'static,
    ) -> ListenerId {
        self.listen_rc(kind, Rc::new(listener))
    }

    pub fn listen_rc(&mut self, kind: EventKind, listener: Listener<H>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, kind, listener));
        id
    }

    /// Remove one listener. Returns whether it was registered.
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _, _)| *l != id);
        self.listeners.len() != before
    }

    /// Listeners for `kind` in registration order.
    pub fn listeners_for(&self, kind: EventKind) -> Vec<Listener<H>> {
        self.listeners
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, l)| l.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;

    #[test]
    fn test_event_names_round_trip() {
        let kinds = [
            EventKind::EditorsInit,
            EventKind::EditorsRegistered,
            EventKind::EditorCreated,
            EventKind::EditorDestroyed,
            EventKind::Editor(InteractionKind::MouseUp),
            EventKind::Editor(InteractionKind::KeyPress),
            EventKind::ToolbarBuild,
            EventKind::ToolbarOpened,
            EventKind::ToolbarClosed,
            EventKind::ToolbarsItem,
        ];
        for kind in kinds {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
        }
        assert_eq!(
            "editor.scroll".parse::<EventKind>(),
            Err(UnknownEvent("editor.scroll".into()))
        );
    }

    #[test]
    fn test_unlisten_removes_only_that_listener() {
        let mut bus: EventBus<MemoryHost> = EventBus::new();
        let a = bus.listen(EventKind::EditorsInit, |_, _| {});
        let _b = bus.listen(EventKind::EditorsInit, |_, _| {});
        let _c = bus.listen(EventKind::ToolbarOpened, |_, _| {});
        assert_eq!(bus.listeners_for(EventKind::EditorsInit).len(), 2);
        assert!(bus.unlisten(a));
        assert!(!bus.unlisten(a));
        assert_eq!(bus.listeners_for(EventKind::EditorsInit).len(), 1);
        assert_eq!(bus.len(), 2);
    }
}
