//! services/dashboard/src/api/reports.rs
//!
//! Client for the `/reports` resource.

use std::sync::Arc;

use agri_core::{
    CreateReportRequest, HttpTransport, Page, RecordId, Report, ReportListParams, ReportStatus,
    ToQueryParams, UpdateReportRequest,
};
use tracing::debug;

use super::{page_from_envelope, record_from_envelope, to_body, ApiResult, API_PREFIX};

#[derive(Clone)]
pub struct ReportApi {
    transport: Arc<dyn HttpTransport>,
}

impl ReportApi {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn collection() -> String {
        format!("{}/reports", API_PREFIX)
    }

    fn member(id: RecordId) -> String {
        format!("{}/reports/{}", API_PREFIX, id)
    }

    /// `GET /reports` with status filter and pagination.
    pub async fn list(&self, params: &ReportListParams) -> ApiResult<Page<Report>> {
        debug!(?params, "listing reports");
        let raw = self
            .transport
            .get(&Self::collection(), params.to_query_params())
            .await?;
        page_from_envelope(raw)
    }

    pub async fn get_by_id(&self, id: RecordId) -> ApiResult<Report> {
        let raw = self
            .transport
            .get(&Self::member(id), Default::default())
            .await?;
        record_from_envelope(raw)
    }

    pub async fn create(&self, request: &CreateReportRequest) -> ApiResult<Report> {
        let raw = self
            .transport
            .post(&Self::collection(), Some(to_body(request)?))
            .await?;
        record_from_envelope(raw)
    }

    /// `PATCH /reports/{id}`; only the fields set in `request` change.
    pub async fn update(&self, id: RecordId, request: &UpdateReportRequest) -> ApiResult<Report> {
        let raw = self
            .transport
            .patch(&Self::member(id), to_body(request)?)
            .await?;
        record_from_envelope(raw)
    }

    /// Moves a report through its review workflow.
    pub async fn update_status(&self, id: RecordId, status: ReportStatus) -> ApiResult<Report> {
        let request = UpdateReportRequest {
            status: Some(status),
            ..Default::default()
        };
        self.update(id, &request).await
    }
}
