//! services/dashboard/src/queries/mod.rs
//!
//! Entity query bindings: each read pairs a cache key with an API call and a
//! staleness policy, each write runs the API call and then invalidates the keys
//! the change could have affected.

use std::sync::Arc;
use std::time::Duration;

use agri_core::{EntityKeys, HttpTransport, RecordId};

use crate::api::{PlotStatusApi, ReportApi, SeasonApi, SoilTypeApi, TaskApi};
use crate::cache::QueryClient;
use crate::config::ReferenceSource;

pub mod reference;
pub mod reports;
pub mod seasons;
pub mod tasks;

pub use reference::{PlotStatusQueries, SoilTypeQueries};
pub use reports::ReportQueries;
pub use seasons::SeasonQueries;
pub use tasks::TaskQueries;

/// Staleness policy. Read-mostly data may be old; frequently edited data may not.
pub mod policy {
    use super::Duration;

    pub const REFERENCE_STALE_TIME: Duration = Duration::from_secs(30 * 60);
    pub const SEASON_STALE_TIME: Duration = Duration::from_secs(10 * 60);
    pub const ACTIVITY_STALE_TIME: Duration = Duration::from_secs(2 * 60);
}

/// Detail queries only run for ids the backend could have issued.
pub(crate) fn valid_id(id: Option<RecordId>) -> Option<RecordId> {
    id.filter(|id| *id > 0)
}

/// After a write to record `id`: every list and that record's detail are stale.
pub(crate) fn invalidate_record(client: &QueryClient, keys: &EntityKeys, id: RecordId) {
    client.invalidate(&keys.lists());
    client.invalidate(&keys.detail(id));
}

/// Every entity binding, built over one transport and one cache.
#[derive(Clone)]
pub struct Queries {
    pub reports: ReportQueries,
    pub tasks: TaskQueries,
    pub seasons: SeasonQueries,
    pub soil_types: SoilTypeQueries,
    pub plot_statuses: PlotStatusQueries,
}

impl Queries {
    pub fn new(
        client: QueryClient,
        transport: Arc<dyn HttpTransport>,
        reference_source: ReferenceSource,
    ) -> Self {
        Self {
            reports: ReportQueries::new(client.clone(), ReportApi::new(transport.clone())),
            tasks: TaskQueries::new(client.clone(), TaskApi::new(transport.clone())),
            seasons: SeasonQueries::new(client.clone(), SeasonApi::new(transport.clone())),
            soil_types: SoilTypeQueries::new(
                client.clone(),
                SoilTypeApi::new(transport.clone(), reference_source),
            ),
            plot_statuses: PlotStatusQueries::new(
                client,
                PlotStatusApi::new(transport, reference_source),
            ),
        }
    }
}
