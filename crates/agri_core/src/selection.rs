//! crates/agri_core/src/selection.rs
//!
//! The selection state machine behind session-scoped choices such as the
//! current season. Pure and synchronous; the async provider that feeds it list
//! updates lives in the dashboard service.

use crate::domain::{Identified, RecordId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(RecordId),
}

impl Selection {
    pub fn id(&self) -> Option<RecordId> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(id) => Some(*id),
        }
    }
}

impl From<Option<RecordId>> for Selection {
    fn from(id: Option<RecordId>) -> Self {
        id.map_or(Selection::Unselected, Selection::Selected)
    }
}

/// Tracks the current selection and whether the one-time default has been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionMachine {
    selection: Selection,
    // Latched by the first auto-selection or by any explicit choice.
    settled: bool,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.selection.id()
    }

    /// Feeds the latest list. Returns `true` when this call auto-selected a record.
    ///
    /// Auto-selection happens at most once per machine: later lists never move
    /// the selection, even when the previously chosen record disappears.
    pub fn observe_list<T, F>(&mut self, records: &[T], eligible: F) -> bool
    where
        T: Identified,
        F: Fn(&T) -> bool,
    {
        if self.settled || self.selection != Selection::Unselected {
            return false;
        }
        match records.iter().find(|r| eligible(*r)) {
            Some(record) => {
                self.selection = Selection::Selected(record.id());
                self.settled = true;
                true
            }
            None => false,
        }
    }

    /// An explicit choice. `None` returns to `Unselected` and stays there.
    pub fn set_selected_id(&mut self, id: Option<RecordId>) {
        self.selection = id.into();
        self.settled = true;
    }

    /// Linear lookup of the selected record in `records`.
    pub fn selected_record<'a, T: Identified>(&self, records: &'a [T]) -> Option<&'a T> {
        let id = self.selection.id()?;
        records.iter().find(|r| r.id() == id)
    }

    /// Back to the initial state, ready to auto-select again.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
