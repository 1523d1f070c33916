//! services/dashboard/src/queries/reports.rs

use std::sync::Arc;

use agri_core::query_key::REPORT_KEYS;
use agri_core::{
    CreateReportRequest, Page, RecordId, Report, ReportListParams, ReportStatus, StateError,
    UpdateReportRequest,
};
use tracing::info;

use super::policy::ACTIVITY_STALE_TIME;
use super::{invalidate_record, valid_id};
use crate::api::{ApiError, ApiResult, ReportApi};
use crate::cache::{Query, QueryClient, QueryOptions};

#[derive(Clone)]
pub struct ReportQueries {
    client: QueryClient,
    api: ReportApi,
}

impl ReportQueries {
    pub fn new(client: QueryClient, api: ReportApi) -> Self {
        Self { client, api }
    }

    pub fn list(&self, params: ReportListParams) -> Query<Page<Report>> {
        let api = self.api.clone();
        let key = REPORT_KEYS.list(&params);
        self.client.watch(key, QueryOptions::stale_for(ACTIVITY_STALE_TIME), move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    pub async fn fetch_list(&self, params: ReportListParams) -> ApiResult<Arc<Page<Report>>> {
        let api = self.api.clone();
        let key = REPORT_KEYS.list(&params);
        self.client
            .fetch(key, ACTIVITY_STALE_TIME, move || {
                let api = api.clone();
                let params = params.clone();
                async move { api.list(&params).await }
            })
            .await
    }

    pub fn detail(&self, id: Option<RecordId>) -> Query<Report> {
        let Some(id) = valid_id(id) else {
            return self.client.disabled();
        };
        let api = self.api.clone();
        self.client.watch(
            REPORT_KEYS.detail(id),
            QueryOptions::stale_for(ACTIVITY_STALE_TIME),
            move || {
                let api = api.clone();
                async move { api.get_by_id(id).await }
            },
        )
    }

    pub async fn fetch_detail(&self, id: RecordId) -> ApiResult<Arc<Report>> {
        let id = valid_id(Some(id))
            .ok_or_else(|| ApiError::State(StateError::Disabled(format!("report #{}", id))))?;
        let api = self.api.clone();
        self.client
            .fetch(REPORT_KEYS.detail(id), ACTIVITY_STALE_TIME, move || {
                let api = api.clone();
                async move { api.get_by_id(id).await }
            })
            .await
    }

    pub async fn create(&self, request: &CreateReportRequest) -> ApiResult<Report> {
        let report = self.api.create(request).await?;
        info!(report_id = report.id, "report filed");
        self.client.invalidate(&REPORT_KEYS.lists());
        Ok(report)
    }

    pub async fn update(&self, id: RecordId, request: &UpdateReportRequest) -> ApiResult<Report> {
        let report = self.api.update(id, request).await?;
        invalidate_record(&self.client, &REPORT_KEYS, id);
        Ok(report)
    }

    pub async fn update_status(&self, id: RecordId, status: ReportStatus) -> ApiResult<Report> {
        let report = self.api.update_status(id, status).await?;
        info!(report_id = id, status = status.as_str(), "report status changed");
        invalidate_record(&self.client, &REPORT_KEYS, id);
        Ok(report)
    }
}
