//! services/dashboard/src/queries/reference.rs
//!
//! Reference data is read-only from the dashboard, so these bindings expose
//! reads only.

use std::sync::Arc;

use agri_core::query_key::{PLOT_STATUS_KEYS, SOIL_TYPE_KEYS};
use agri_core::{PlotStatus, SoilType};

use super::policy::REFERENCE_STALE_TIME;
use crate::api::{ApiResult, PlotStatusApi, SoilTypeApi};
use crate::cache::{Query, QueryClient, QueryOptions};

#[derive(Clone)]
pub struct SoilTypeQueries {
    client: QueryClient,
    api: SoilTypeApi,
}

impl SoilTypeQueries {
    pub fn new(client: QueryClient, api: SoilTypeApi) -> Self {
        Self { client, api }
    }

    pub fn list(&self) -> Query<Vec<SoilType>> {
        let api = self.api.clone();
        self.client.watch(
            SOIL_TYPE_KEYS.list(&()),
            QueryOptions::stale_for(REFERENCE_STALE_TIME),
            move || {
                let api = api.clone();
                async move { api.list_all().await }
            },
        )
    }

    pub async fn fetch_list(&self) -> ApiResult<Arc<Vec<SoilType>>> {
        let api = self.api.clone();
        self.client
            .fetch(SOIL_TYPE_KEYS.list(&()), REFERENCE_STALE_TIME, move || {
                let api = api.clone();
                async move { api.list_all().await }
            })
            .await
    }
}

#[derive(Clone)]
pub struct PlotStatusQueries {
    client: QueryClient,
    api: PlotStatusApi,
}

impl PlotStatusQueries {
    pub fn new(client: QueryClient, api: PlotStatusApi) -> Self {
        Self { client, api }
    }

    pub fn list(&self) -> Query<Vec<PlotStatus>> {
        let api = self.api.clone();
        self.client.watch(
            PLOT_STATUS_KEYS.list(&()),
            QueryOptions::stale_for(REFERENCE_STALE_TIME),
            move || {
                let api = api.clone();
                async move { api.list_all().await }
            },
        )
    }

    pub async fn fetch_list(&self) -> ApiResult<Arc<Vec<PlotStatus>>> {
        let api = self.api.clone();
        self.client
            .fetch(PLOT_STATUS_KEYS.list(&()), REFERENCE_STALE_TIME, move || {
                let api = api.clone();
                async move { api.list_all().await }
            })
            .await
    }
}
