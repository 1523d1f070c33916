//! services/dashboard/src/queries/seasons.rs

use std::sync::Arc;

use agri_core::query_key::SEASON_KEYS;
use agri_core::{CreateSeasonRequest, RecordId, Season, StateError, UpdateSeasonRequest};
use tracing::info;

use super::policy::SEASON_STALE_TIME;
use super::{invalidate_record, valid_id};
use crate::api::{ApiError, ApiResult, SeasonApi};
use crate::cache::{Query, QueryClient, QueryOptions};

#[derive(Clone)]
pub struct SeasonQueries {
    client: QueryClient,
    api: SeasonApi,
}

impl SeasonQueries {
    pub fn new(client: QueryClient, api: SeasonApi) -> Self {
        Self { client, api }
    }

    /// The full season list; this is what the season selection watches.
    pub fn list(&self) -> Query<Vec<Season>> {
        let api = self.api.clone();
        self.client.watch(
            SEASON_KEYS.list(&()),
            QueryOptions::stale_for(SEASON_STALE_TIME),
            move || {
                let api = api.clone();
                async move { api.list_all().await }
            },
        )
    }

    pub async fn fetch_list(&self) -> ApiResult<Arc<Vec<Season>>> {
        let api = self.api.clone();
        self.client
            .fetch(SEASON_KEYS.list(&()), SEASON_STALE_TIME, move || {
                let api = api.clone();
                async move { api.list_all().await }
            })
            .await
    }

    /// Marks every cached season query invalid; observed ones refetch.
    pub fn invalidate_all(&self) -> usize {
        self.client.invalidate(&SEASON_KEYS.all())
    }

    pub fn detail(&self, id: Option<RecordId>) -> Query<Season> {
        let Some(id) = valid_id(id) else {
            return self.client.disabled();
        };
        let api = self.api.clone();
        self.client.watch(
            SEASON_KEYS.detail(id),
            QueryOptions::stale_for(SEASON_STALE_TIME),
            move || {
                let api = api.clone();
                async move { api.get_by_id(id).await }
            },
        )
    }

    pub async fn fetch_detail(&self, id: RecordId) -> ApiResult<Arc<Season>> {
        let id = valid_id(Some(id))
            .ok_or_else(|| ApiError::State(StateError::Disabled(format!("season #{}", id))))?;
        let api = self.api.clone();
        self.client
            .fetch(SEASON_KEYS.detail(id), SEASON_STALE_TIME, move || {
                let api = api.clone();
                async move { api.get_by_id(id).await }
            })
            .await
    }

    pub async fn create(&self, request: &CreateSeasonRequest) -> ApiResult<Season> {
        let season = self.api.create(request).await?;
        info!(season_id = season.id, "season created");
        self.client.invalidate(&SEASON_KEYS.lists());
        Ok(season)
    }

    pub async fn update(&self, id: RecordId, request: &UpdateSeasonRequest) -> ApiResult<Season> {
        let season = self.api.update(id, request).await?;
        invalidate_record(&self.client, &SEASON_KEYS, id);
        Ok(season)
    }
}
