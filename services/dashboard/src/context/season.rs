//! services/dashboard/src/context/season.rs
//!
//! The season selection shared by every season-scoped view.
//!
//! The provider owns the state and the background task that feeds it the
//! season list; views are read-only and can be handed to anything that only
//! needs to know which season is current.

use std::sync::Arc;

use agri_core::{RecordId, Season, SeasonStatus, Selection, SelectionMachine, StateError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Query;
use crate::queries::SeasonQueries;

/// What every consumer of the selection sees.
#[derive(Debug, Clone, Default)]
pub struct SeasonSelectionState {
    machine: SelectionMachine,
    seasons: Option<Arc<Vec<Season>>>,
}

impl SeasonSelectionState {
    pub fn selection(&self) -> Selection {
        self.machine.selection()
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.machine.selected_id()
    }

    /// True once the season list has resolved at least once.
    pub fn is_loaded(&self) -> bool {
        self.seasons.is_some()
    }

    pub fn seasons(&self) -> &[Season] {
        self.seasons.as_deref().map(Vec::as_slice).unwrap_or(&[])
    }

    /// The selected season, or `None` when nothing is selected or the selected
    /// id is no longer in the list.
    pub fn selected_season(&self) -> Option<&Season> {
        self.machine.selected_record(self.seasons())
    }
}

//=========================================================================================
// Provider (mutating capability)
//=========================================================================================

pub struct SeasonSelectionProvider {
    state: Arc<watch::Sender<SeasonSelectionState>>,
    queries: SeasonQueries,
    driver: JoinHandle<()>,
}

impl SeasonSelectionProvider {
    /// Starts watching the season list. Must be called inside a tokio runtime.
    ///
    /// The first season whose status is `eligible` is selected automatically,
    /// once; explicit choices are never overridden.
    pub fn mount(queries: SeasonQueries, eligible: SeasonStatus) -> Self {
        let (sender, _) = watch::channel(SeasonSelectionState::default());
        let state = Arc::new(sender);
        let driver = tokio::spawn(drive(queries.list(), state.clone(), eligible));
        Self {
            state,
            queries,
            driver,
        }
    }

    pub fn view(&self) -> SeasonSelectionView {
        SeasonSelectionView {
            receiver: self.state.subscribe(),
        }
    }

    pub fn current(&self) -> SeasonSelectionState {
        self.state.borrow().clone()
    }

    pub fn set_selected_id(&self, id: Option<RecordId>) {
        self.state.send_modify(|s| s.machine.set_selected_id(id));
        info!(season_id = ?id, "season selected");
    }

    /// Forgets the selection and the list, for example after sign-out.
    pub fn reset(&self) {
        self.state.send_modify(|s| *s = SeasonSelectionState::default());
        debug!("season selection reset");
    }

    /// Refetches the watched season list, e.g. after signing back in.
    pub fn refresh(&self) {
        let hit = self.queries.invalidate_all();
        debug!(hit, "season list refresh requested");
    }
}

impl Drop for SeasonSelectionProvider {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(
    mut query: Query<Vec<Season>>,
    state: Arc<watch::Sender<SeasonSelectionState>>,
    eligible: SeasonStatus,
) {
    loop {
        let seasons = query.data();
        state.send_if_modified(|s| {
            let list_changed = match (&s.seasons, &seasons) {
                (Some(old), Some(new)) => !Arc::ptr_eq(old, new),
                (None, None) => false,
                _ => true,
            };
            let mut auto_selected = false;
            if let Some(list) = &seasons {
                auto_selected = s
                    .machine
                    .observe_list(list.as_slice(), |season| season.status == eligible);
                if auto_selected {
                    info!(season_id = ?s.machine.selected_id(), "season auto-selected");
                }
            }
            s.seasons = seasons;
            list_changed || auto_selected
        });
        query.changed().await;
    }
}

//=========================================================================================
// View (read-only capability)
//=========================================================================================

#[derive(Clone)]
pub struct SeasonSelectionView {
    receiver: watch::Receiver<SeasonSelectionState>,
}

impl SeasonSelectionView {
    pub fn current(&self) -> SeasonSelectionState {
        self.receiver.borrow().clone()
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.receiver.borrow().selected_id()
    }

    pub fn selected_season(&self) -> Option<Season> {
        self.receiver.borrow().selected_season().cloned()
    }

    /// Waits for the next change. Fails once the provider has been dropped.
    pub async fn changed(&mut self) -> Result<(), StateError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| StateError::MissingProvider("SeasonSelection"))
    }

    /// Waits until `predicate` holds for the current state and returns it.
    pub async fn wait_until<F>(&mut self, predicate: F) -> Result<SeasonSelectionState, StateError>
    where
        F: Fn(&SeasonSelectionState) -> bool,
    {
        loop {
            {
                let current = self.receiver.borrow_and_update();
                if predicate(&*current) {
                    return Ok(current.clone());
                }
            }
            self.changed().await?;
        }
    }
}
