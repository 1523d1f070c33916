//! services/dashboard/src/api/seasons.rs
//!
//! Client for the `/seasons` resource.

use std::sync::Arc;

use agri_core::{CreateSeasonRequest, HttpTransport, RecordId, Season, UpdateSeasonRequest};

use super::{list_from_payload, record_from_envelope, to_body, ApiResult, API_PREFIX};

#[derive(Clone)]
pub struct SeasonApi {
    transport: Arc<dyn HttpTransport>,
}

impl SeasonApi {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn collection() -> String {
        format!("{}/seasons", API_PREFIX)
    }

    fn member(id: RecordId) -> String {
        format!("{}/seasons/{}", API_PREFIX, id)
    }

    /// Every season the user can see. The backend does not paginate seasons.
    pub async fn list_all(&self) -> ApiResult<Vec<Season>> {
        let raw = self
            .transport
            .get(&Self::collection(), Default::default())
            .await?;
        list_from_payload(raw)
    }

    pub async fn get_by_id(&self, id: RecordId) -> ApiResult<Season> {
        let raw = self
            .transport
            .get(&Self::member(id), Default::default())
            .await?;
        record_from_envelope(raw)
    }

    pub async fn create(&self, request: &CreateSeasonRequest) -> ApiResult<Season> {
        let raw = self
            .transport
            .post(&Self::collection(), Some(to_body(request)?))
            .await?;
        record_from_envelope(raw)
    }

    pub async fn update(&self, id: RecordId, request: &UpdateSeasonRequest) -> ApiResult<Season> {
        let raw = self
            .transport
            .patch(&Self::member(id), to_body(request)?)
            .await?;
        record_from_envelope(raw)
    }
}
