//! services/dashboard/src/context/mod.rs
//!
//! Defines the application context: the one object passed down to every view,
//! carrying the cache, the entity bindings and the session-scoped providers.

use std::sync::Arc;

use agri_core::{HttpTransport, SeasonStatus, StateError};
use tracing::info;

use crate::cache::QueryClient;
use crate::config::Config;
use crate::queries::Queries;

pub mod season;
pub mod session;

pub use season::{SeasonSelectionProvider, SeasonSelectionState, SeasonSelectionView};
pub use session::{Role, Session};

pub struct AppContext {
    client: QueryClient,
    queries: Queries,
    session: Option<Session>,
    season: Option<SeasonSelectionProvider>,
}

impl AppContext {
    pub fn new(client: QueryClient, queries: Queries) -> Self {
        Self {
            client,
            queries,
            session: None,
            season: None,
        }
    }

    /// Builds the cache and every entity binding from the loaded configuration.
    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let client = QueryClient::new(config.cache.clone());
        let queries = Queries::new(client.clone(), transport, config.reference_source);
        Self::new(client, queries)
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    //=====================================================================================
    // Season Selection
    //=====================================================================================

    /// Mounts the season selection provider, replacing any previous one.
    pub fn provide_season_selection(&mut self, eligible: SeasonStatus) -> SeasonSelectionView {
        let provider = SeasonSelectionProvider::mount(self.queries.seasons.clone(), eligible);
        let view = provider.view();
        self.season = Some(provider);
        view
    }

    /// Read-only access for any consumer.
    pub fn season_selection(&self) -> Result<SeasonSelectionView, StateError> {
        self.season
            .as_ref()
            .map(SeasonSelectionProvider::view)
            .ok_or(StateError::MissingProvider("SeasonSelection"))
    }

    /// Mutating access, for the season picker.
    pub fn season_selection_control(&self) -> Result<&SeasonSelectionProvider, StateError> {
        self.season
            .as_ref()
            .ok_or(StateError::MissingProvider("SeasonSelection"))
    }

    //=====================================================================================
    // Session
    //=====================================================================================

    pub fn sign_in(&mut self, session: Session) {
        info!(user = %session.user_name, role = %session.role, "signed in");
        self.session = Some(session);
        if let Some(season) = &self.season {
            season.refresh();
        }
    }

    pub fn session(&self) -> Result<&Session, StateError> {
        self.session
            .as_ref()
            .ok_or(StateError::MissingProvider("Session"))
    }

    /// Drops the session, every cached value and the season selection.
    pub fn sign_out(&mut self) -> Option<Session> {
        self.client.clear();
        if let Some(season) = &self.season {
            season.reset();
        }
        let session = self.session.take();
        if let Some(session) = &session {
            info!(user = %session.user_name, "signed out");
        }
        session
    }
}
