//! Guest commands exposed through the host menu.
//!
//! A [`CommandSet`] is built once per displayable. Every command gets a
//! [`CommandId`] assigned in declaration order at build time, so a host menu
//! selection can be correlated back to the originating command without
//! relying on object identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::displayable::Displayable;

/// Identifier of a command, unique within its [`CommandSet`]. Menus pair it
/// with the displayable's id, since other sets reuse the same values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandId(u32);

impl CommandId {
    /// Raw value, e.g. for a platform menu item id.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd#{}", self.0)
    }
}

/// Semantic kind of a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    /// Application-defined screen action
    Screen,
    /// Navigate back
    Back,
    /// Dismiss without action
    Cancel,
    /// Confirm
    Ok,
    /// Show help
    Help,
    /// Stop a running operation
    Stop,
    /// Leave the application
    Exit,
    /// Action on a focused item
    Item,
}

/// A guest command as presented to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    /// Stable identifier
    pub id: CommandId,

    /// Menu label
    pub label: String,

    /// Semantic kind
    pub kind: CommandKind,

    /// Lower values are listed first
    pub priority: i32,
}

/// Immutable, ordered set of commands attached to a displayable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    commands: Vec<CommandEntry>,
}

impl CommandSet {
    /// A set with no commands.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a set.
    pub fn builder() -> CommandSetBuilder {
        CommandSetBuilder::default()
    }

    /// Find a command by id.
    pub fn get(&self, id: CommandId) -> Option<&CommandEntry> {
        self.commands.iter().find(|c| c.id == id)
    }

    /// Commands in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> {
        self.commands.iter()
    }

    /// Commands in menu order: ascending priority, ties keep declaration
    /// order.
    pub fn menu_order(&self) -> Vec<&CommandEntry> {
        let mut ordered: Vec<&CommandEntry> = self.commands.iter().collect();
        ordered.sort_by_key(|c| c.priority);
        ordered
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Builder assigning sequential ids.
#[derive(Debug, Default)]
pub struct CommandSetBuilder {
    commands: Vec<CommandEntry>,
}

impl CommandSetBuilder {
    /// Add a command.
    pub fn command(mut self, label: impl Into<String>, kind: CommandKind, priority: i32) -> Self {
        let id = CommandId(self.commands.len() as u32 + 1);
        self.commands.push(CommandEntry {
            id,
            label: label.into(),
            kind,
            priority,
        });
        self
    }

    /// Finish the set.
    pub fn build(self) -> CommandSet {
        CommandSet {
            commands: self.commands,
        }
    }
}

/// Handler the guest registers on a displayable to receive command actions.
///
/// Invoked on the session's guest event thread, one action at a time in
/// selection order. The host never waits for it to return.
pub trait CommandListener: Send + Sync {
    /// A command of `displayable` was selected in the host menu.
    fn command_action(&self, command: &CommandEntry, displayable: &Displayable);
}
