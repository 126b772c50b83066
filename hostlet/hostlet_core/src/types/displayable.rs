//! Guest displayables.
//!
//! A displayable is "the thing currently shown" by the guest. Its content is
//! a tagged variant; the host decides chrome and immersive mode by matching
//! on [`DisplayableKind`], never by inspecting concrete guest types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::command::{CommandListener, CommandSet};
use crate::id::DisplayableId;

/// Discriminator of [`DisplayableContent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayableKind {
    /// Guest-drawn surface covering the whole window
    FullScreenSurface,
    /// Host-rendered form with fields
    WindowedForm,
    /// Any other host-rendered screen (lists, alerts, text boxes)
    Other,
}

impl fmt::Display for DisplayableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullScreenSurface => write!(f, "full-screen surface"),
            Self::WindowedForm => write!(f, "windowed form"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Variant-specific rendering metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayableContent {
    /// A drawing surface. `size` is the guest's preferred size in pixels;
    /// `None` means "fill the window".
    FullScreenSurface {
        /// Preferred width and height
        size: Option<(u32, u32)>,
    },

    /// A form; `items` are the field labels in display order.
    WindowedForm {
        /// Field labels
        items: Vec<String>,
    },

    /// Another screen type, named by the widget the host should render.
    Other {
        /// Widget name, e.g. `list` or `alert`
        widget: String,
    },
}

impl DisplayableContent {
    /// The kind discriminator.
    pub fn kind(&self) -> DisplayableKind {
        match self {
            Self::FullScreenSurface { .. } => DisplayableKind::FullScreenSurface,
            Self::WindowedForm { .. } => DisplayableKind::WindowedForm,
            Self::Other { .. } => DisplayableKind::Other,
        }
    }
}

/// An immutable view descriptor handed from the guest to the host.
///
/// Displayables are shared as `Arc<Displayable>` between the guest thread
/// that creates them and the UI-owning thread that shows them.
#[derive(Clone)]
pub struct Displayable {
    id: DisplayableId,
    title: String,
    content: DisplayableContent,
    commands: CommandSet,
    listener: Option<Arc<dyn CommandListener>>,
}

impl Displayable {
    /// Create a displayable with the given content.
    pub fn new(title: impl Into<String>, content: DisplayableContent) -> Self {
        Self {
            id: DisplayableId::new(),
            title: title.into(),
            content,
            commands: CommandSet::empty(),
            listener: None,
        }
    }

    /// A full-screen surface filling the window.
    pub fn surface(title: impl Into<String>) -> Self {
        Self::new(title, DisplayableContent::FullScreenSurface { size: None })
    }

    /// A form with the given field labels.
    pub fn form<I, S>(title: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            title,
            DisplayableContent::WindowedForm {
                items: items.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Attach a command set.
    pub fn with_commands(mut self, commands: CommandSet) -> Self {
        self.commands = commands;
        self
    }

    /// Register the command handler.
    pub fn with_listener(mut self, listener: Arc<dyn CommandListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Identifier.
    pub fn id(&self) -> DisplayableId {
        self.id
    }

    /// Title shown in the host chrome for non-surface kinds.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Rendering metadata.
    pub fn content(&self) -> &DisplayableContent {
        &self.content
    }

    /// Kind discriminator.
    pub fn kind(&self) -> DisplayableKind {
        self.content.kind()
    }

    /// Commands attached to this displayable.
    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Registered command handler, if any.
    pub fn listener(&self) -> Option<&Arc<dyn CommandListener>> {
        self.listener.as_ref()
    }
}

impl fmt::Debug for Displayable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Displayable")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("content", &self.content)
            .field("commands", &self.commands.len())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
