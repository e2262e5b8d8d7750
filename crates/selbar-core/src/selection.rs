//! The selection-source collaborator.

use std::cell::RefCell;
use std::rc::Rc;

/// Where the current text selection comes from.
///
/// Hosts with native selection-change events push text straight into the
/// shell; constrained-input hosts hand the shell a source to poll once per
/// update instead.
pub trait SelectionSource {
    /// Current selection text, or `None` when nothing is selected.
    fn current_selection(&self) -> Option<String>;
}

/// A shared, mutable selection slot: an event handler writes into it, the
/// shell polls it per frame.
#[derive(Clone, Default)]
pub struct SharedSelection(Rc<RefCell<Option<String>>>);

impl SharedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current selection.
    pub fn set(&self, text: impl Into<String>) {
        *self.0.borrow_mut() = Some(text.into());
    }

    /// Clear the selection.
    pub fn clear(&self) {
        *self.0.borrow_mut() = None;
    }
}

impl SelectionSource for SharedSelection {
    fn current_selection(&self) -> Option<String> {
        self.0.borrow().clone()
    }
}
