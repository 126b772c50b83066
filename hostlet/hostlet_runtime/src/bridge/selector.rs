//! Entry point selection.

use std::path::PathBuf;

use hostlet_core::{EntryPointDescriptor, Result, SessionError};
use tracing::{debug, warn};

/// Outcome of [`EntrySelector::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Exactly one entry; start it without asking
    Immediate(EntryPointDescriptor),

    /// Ask the user; display names in manifest order
    Prompt(Vec<String>),
}

/// Chooses which declared entry point to start.
#[derive(Debug)]
pub struct EntrySelector {
    manifest: PathBuf,
    entries: Vec<EntryPointDescriptor>,
    pending: bool,
}

impl EntrySelector {
    /// Selector over `entries` declared in the descriptor at `manifest`.
    pub fn new(manifest: impl Into<PathBuf>, entries: Vec<EntryPointDescriptor>) -> Self {
        Self {
            manifest: manifest.into(),
            entries,
            pending: false,
        }
    }

    /// Declared entries.
    pub fn entries(&self) -> &[EntryPointDescriptor] {
        &self.entries
    }

    /// Whether a prompt is waiting for [`EntrySelector::resolve`].
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Decide how to proceed.
    pub fn select(&mut self) -> Result<Selection> {
        match self.entries.as_slice() {
            [] => Err(SessionError::EntryNotFound(self.manifest.clone())),
            [only] => Ok(Selection::Immediate(only.clone())),
            many => {
                self.pending = true;
                Ok(Selection::Prompt(
                    many.iter().map(|e| e.display_name.clone()).collect(),
                ))
            }
        }
    }

    /// Answer a pending prompt.
    ///
    /// `None` means the prompt was dismissed and yields
    /// [`SessionError::Cancelled`]. An index outside the list is ignored
    /// and the prompt stays pending.
    pub fn resolve(&mut self, choice: Option<usize>) -> Result<Option<EntryPointDescriptor>> {
        if !self.pending {
            warn!("entry chosen while no prompt is pending");
            return Ok(None);
        }

        match choice {
            None => {
                self.pending = false;
                debug!("entry selection cancelled");
                Err(SessionError::Cancelled)
            }
            Some(index) => match self.entries.get(index) {
                Some(entry) => {
                    self.pending = false;
                    debug!(index, class = %entry.class_name, "entry chosen");
                    Ok(Some(entry.clone()))
                }
                None => {
                    warn!(index, count = self.entries.len(), "entry index out of range");
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<EntryPointDescriptor> {
        (1..=n)
            .map(|i| {
                EntryPointDescriptor::new(format!("Game {}", i), format!("com.example.Game{}", i))
            })
            .collect()
    }

    #[test]
    fn test_no_entries() {
        let mut selector = EntrySelector::new("MANIFEST.MF", Vec::new());
        assert!(matches!(selector.select(), Err(SessionError::EntryNotFound(_))));
    }

    #[test]
    fn test_single_entry_is_immediate() {
        let mut selector = EntrySelector::new("MANIFEST.MF", entries(1));
        assert_eq!(
            selector.select().unwrap(),
            Selection::Immediate(EntryPointDescriptor::new("Game 1", "com.example.Game1"))
        );
        assert!(!selector.is_pending());
    }

    #[test]
    fn test_prompt_and_choice() {
        let mut selector = EntrySelector::new("MANIFEST.MF", entries(3));
        assert_eq!(
            selector.select().unwrap(),
            Selection::Prompt(vec!["Game 1".into(), "Game 2".into(), "Game 3".into()])
        );
        assert!(selector.is_pending());

        assert_eq!(selector.resolve(Some(7)).unwrap(), None);
        assert!(selector.is_pending());

        let chosen = selector.resolve(Some(1)).unwrap().unwrap();
        assert_eq!(chosen.class_name, "com.example.Game2");
        assert!(!selector.is_pending());
        assert_eq!(selector.resolve(Some(0)).unwrap(), None);
    }

    #[test]
    fn test_dismissed_prompt_cancels() {
        let mut selector = EntrySelector::new("MANIFEST.MF", entries(2));
        selector.select().unwrap();
        assert!(matches!(selector.resolve(None), Err(SessionError::Cancelled)));
        assert!(!selector.is_pending());
    }
}
