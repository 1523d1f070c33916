//! services/dashboard/src/api/tasks.rs
//!
//! Client for the `/tasks` resource, including its state-transition actions.

use std::sync::Arc;

use agri_core::{
    CompleteTaskRequest, CreateTaskRequest, HttpTransport, Page, RecordId, Task, TaskListParams,
    ToQueryParams, UpdateTaskRequest,
};
use tracing::debug;

use super::{page_from_envelope, record_from_envelope, to_body, ApiResult, API_PREFIX};

#[derive(Clone)]
pub struct TaskApi {
    transport: Arc<dyn HttpTransport>,
}

impl TaskApi {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn collection() -> String {
        format!("{}/tasks", API_PREFIX)
    }

    fn member(id: RecordId) -> String {
        format!("{}/tasks/{}", API_PREFIX, id)
    }

    fn action(id: RecordId, action: &str) -> String {
        format!("{}/tasks/{}/{}", API_PREFIX, id, action)
    }

    pub async fn list(&self, params: &TaskListParams) -> ApiResult<Page<Task>> {
        debug!(?params, "listing tasks");
        let raw = self
            .transport
            .get(&Self::collection(), params.to_query_params())
            .await?;
        page_from_envelope(raw)
    }

    pub async fn get_by_id(&self, id: RecordId) -> ApiResult<Task> {
        let raw = self
            .transport
            .get(&Self::member(id), Default::default())
            .await?;
        record_from_envelope(raw)
    }

    pub async fn create(&self, request: &CreateTaskRequest) -> ApiResult<Task> {
        let raw = self
            .transport
            .post(&Self::collection(), Some(to_body(request)?))
            .await?;
        record_from_envelope(raw)
    }

    pub async fn update(&self, id: RecordId, request: &UpdateTaskRequest) -> ApiResult<Task> {
        let raw = self
            .transport
            .patch(&Self::member(id), to_body(request)?)
            .await?;
        record_from_envelope(raw)
    }

    /// `POST /tasks/{id}/start`.
    pub async fn start(&self, id: RecordId) -> ApiResult<Task> {
        debug!(task_id = id, "starting task");
        let raw = self.transport.post(&Self::action(id, "start"), None).await?;
        record_from_envelope(raw)
    }

    /// `POST /tasks/{id}/complete`; the body carries the end date.
    pub async fn complete(&self, id: RecordId, request: &CompleteTaskRequest) -> ApiResult<Task> {
        debug!(task_id = id, end_date = %request.end_date, "completing task");
        let raw = self
            .transport
            .post(&Self::action(id, "complete"), Some(to_body(request)?))
            .await?;
        record_from_envelope(raw)
    }
}
