//! services/dashboard/src/api/reference.rs
//!
//! Clients for read-mostly reference data: soil types and plot statuses.
//!
//! Both can serve a locally defined table or the backend's endpoint. Either
//! way the payload goes through the same validator, so switching sources never
//! changes what callers receive.

use std::sync::Arc;

use agri_core::{HttpTransport, PlotStatus, Schema, SoilType};
use serde_json::{json, Value};
use tracing::debug;

use super::{list_from_payload, ApiResult, API_PREFIX};
use crate::config::ReferenceSource;

fn plot_status_table() -> Value {
    json!([
        {"id": 1, "statusName": "AVAILABLE", "description": "Free and ready to be planted"},
        {"id": 2, "statusName": "PLANNED", "description": "Assigned to an upcoming season"},
        {"id": 3, "statusName": "ACTIVE", "description": "Under cultivation"},
        {"id": 4, "statusName": "RESTING", "description": "Left fallow to recover"},
        {"id": 5, "statusName": "INACTIVE", "description": "Out of use"},
    ])
}

fn soil_type_table() -> Value {
    json!([
        {"id": 1, "soilName": "Clay", "description": "Fine particles, holds water and nutrients"},
        {"id": 2, "soilName": "Sandy", "description": "Coarse, drains quickly, warms early"},
        {"id": 3, "soilName": "Loam", "description": "Balanced mix of sand, silt and clay"},
        {"id": 4, "soilName": "Silt", "description": "Smooth and fertile, prone to compaction"},
        {"id": 5, "soilName": "Peat", "description": "High organic matter, acidic"},
        {"id": 6, "soilName": "Chalk", "description": "Alkaline and stony"},
    ])
}

/// Shared plumbing of the two reference clients.
#[derive(Clone)]
struct ReferenceClient {
    transport: Arc<dyn HttpTransport>,
    source: ReferenceSource,
    path: &'static str,
    table: fn() -> Value,
}

impl ReferenceClient {
    async fn list_all<T: Schema>(&self) -> ApiResult<Vec<T>> {
        let raw = match self.source {
            ReferenceSource::Static => {
                debug!(entity = T::ENTITY, "serving static reference data");
                (self.table)()
            }
            ReferenceSource::Network => {
                let path = format!("{}/{}", API_PREFIX, self.path);
                self.transport.get(&path, Default::default()).await?
            }
        };
        list_from_payload(raw)
    }
}

#[derive(Clone)]
pub struct SoilTypeApi {
    inner: ReferenceClient,
}

impl SoilTypeApi {
    pub fn new(transport: Arc<dyn HttpTransport>, source: ReferenceSource) -> Self {
        Self {
            inner: ReferenceClient {
                transport,
                source,
                path: "soil-types",
                table: soil_type_table,
            },
        }
    }

    pub fn source(&self) -> ReferenceSource {
        self.inner.source
    }

    pub async fn list_all(&self) -> ApiResult<Vec<SoilType>> {
        self.inner.list_all().await
    }
}

#[derive(Clone)]
pub struct PlotStatusApi {
    inner: ReferenceClient,
}

impl PlotStatusApi {
    pub fn new(transport: Arc<dyn HttpTransport>, source: ReferenceSource) -> Self {
        Self {
            inner: ReferenceClient {
                transport,
                source,
                path: "plot-statuses",
                table: plot_status_table,
            },
        }
    }

    pub fn source(&self) -> ReferenceSource {
        self.inner.source
    }

    pub async fn list_all(&self) -> ApiResult<Vec<PlotStatus>> {
        self.inner.list_all().await
    }
}
