//! services/dashboard/src/queries/tasks.rs

use std::sync::Arc;

use agri_core::query_key::TASK_KEYS;
use agri_core::{
    CompleteTaskRequest, CreateTaskRequest, Page, RecordId, StateError, Task, TaskListParams,
    UpdateTaskRequest,
};
use tracing::info;

use super::policy::ACTIVITY_STALE_TIME;
use super::{invalidate_record, valid_id};
use crate::api::{ApiError, ApiResult, TaskApi};
use crate::cache::{Query, QueryClient, QueryOptions};

#[derive(Clone)]
pub struct TaskQueries {
    client: QueryClient,
    api: TaskApi,
}

impl TaskQueries {
    pub fn new(client: QueryClient, api: TaskApi) -> Self {
        Self { client, api }
    }

    pub fn api(&self) -> &TaskApi {
        &self.api
    }

    //=====================================================================================
    // Reads
    //=====================================================================================

    pub fn list(&self, params: TaskListParams) -> Query<Page<Task>> {
        let api = self.api.clone();
        let key = TASK_KEYS.list(&params);
        self.client.watch(key, QueryOptions::stale_for(ACTIVITY_STALE_TIME), move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    pub async fn fetch_list(&self, params: TaskListParams) -> ApiResult<Arc<Page<Task>>> {
        let api = self.api.clone();
        let key = TASK_KEYS.list(&params);
        self.client
            .fetch(key, ACTIVITY_STALE_TIME, move || {
                let api = api.clone();
                let params = params.clone();
                async move { api.list(&params).await }
            })
            .await
    }

    /// Disabled (no request, permanently pending) unless `id` is a positive key.
    pub fn detail(&self, id: Option<RecordId>) -> Query<Task> {
        let Some(id) = valid_id(id) else {
            return self.client.disabled();
        };
        let api = self.api.clone();
        self.client.watch(
            TASK_KEYS.detail(id),
            QueryOptions::stale_for(ACTIVITY_STALE_TIME),
            move || {
                let api = api.clone();
                async move { api.get_by_id(id).await }
            },
        )
    }

    pub async fn fetch_detail(&self, id: RecordId) -> ApiResult<Arc<Task>> {
        let id = valid_id(Some(id))
            .ok_or_else(|| ApiError::State(StateError::Disabled(format!("task #{}", id))))?;
        let api = self.api.clone();
        self.client
            .fetch(TASK_KEYS.detail(id), ACTIVITY_STALE_TIME, move || {
                let api = api.clone();
                async move { api.get_by_id(id).await }
            })
            .await
    }

    //=====================================================================================
    // Writes
    //=====================================================================================

    pub async fn create(&self, request: &CreateTaskRequest) -> ApiResult<Task> {
        let task = self.api.create(request).await?;
        info!(task_id = task.id, "task created");
        self.client.invalidate(&TASK_KEYS.lists());
        Ok(task)
    }

    pub async fn update(&self, id: RecordId, request: &UpdateTaskRequest) -> ApiResult<Task> {
        let task = self.api.update(id, request).await?;
        invalidate_record(&self.client, &TASK_KEYS, id);
        Ok(task)
    }

    pub async fn start(&self, id: RecordId) -> ApiResult<Task> {
        let task = self.api.start(id).await?;
        info!(task_id = id, "task started");
        invalidate_record(&self.client, &TASK_KEYS, id);
        Ok(task)
    }

    pub async fn complete(&self, id: RecordId, request: &CompleteTaskRequest) -> ApiResult<Task> {
        let task = self.api.complete(id, request).await?;
        info!(task_id = id, "task completed");
        invalidate_record(&self.client, &TASK_KEYS, id);
        Ok(task)
    }
}
