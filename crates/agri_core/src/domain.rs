//! crates/agri_core/src/domain.rs
//!
//! Defines the plain records returned by the farm backend, the payloads sent to
//! it, and the envelopes that wrap them on the wire.
//! These structs carry no behavior beyond (de)serialization and identity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query_key::{QueryParams, ToQueryParams};

/// The identifying integer key the backend assigns to every record.
pub type RecordId = i64;

/// Anything that carries a backend-assigned identifying key.
pub trait Identified {
    fn id(&self) -> RecordId;
}

macro_rules! identified {
    ($($ty:ty),+ $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> RecordId {
                self.id
            }
        })+
    };
}

//=========================================================================================
// Status Enums
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlotStatusName {
    Available,
    Planned,
    Active,
    Resting,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonStatus {
    Planned,
    Active,
    Completed,
}

impl PlotStatusName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotStatusName::Available => "AVAILABLE",
            PlotStatusName::Planned => "PLANNED",
            PlotStatusName::Active => "ACTIVE",
            PlotStatusName::Resting => "RESTING",
            PlotStatusName::Inactive => "INACTIVE",
        }
    }
}

impl SeasonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonStatus::Planned => "PLANNED",
            SeasonStatus::Active => "ACTIVE",
            SeasonStatus::Completed => "COMPLETED",
        }
    }
}

impl std::str::FromStr for SeasonStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PLANNED" => Ok(SeasonStatus::Planned),
            "ACTIVE" => Ok(SeasonStatus::Active),
            "COMPLETED" => Ok(SeasonStatus::Completed),
            other => Err(format!("'{}' is not a season status", other)),
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::InProgress => "IN_PROGRESS",
            ReportStatus::Resolved => "RESOLVED",
            ReportStatus::Closed => "CLOSED",
        }
    }
}

//=========================================================================================
// Resource Records
//=========================================================================================

/// A field report filed by a farmer or buyer and handled by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub plot_id: Option<RecordId>,
    pub reporter_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Reference data: a soil classification a plot can be tagged with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilType {
    pub id: RecordId,
    pub soil_name: String,
    pub description: Option<String>,
}

/// Reference data: the lifecycle state a plot can be in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotStatus {
    pub id: RecordId,
    pub status_name: PlotStatusName,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub task_name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub plot_id: Option<RecordId>,
    pub season_id: Option<RecordId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A growing season. Most dashboard views are scoped to the selected season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: RecordId,
    pub season_name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: SeasonStatus,
}

identified!(Report, SoilType, PlotStatus, Task, Season);

//=========================================================================================
// Envelopes
//=========================================================================================

/// A validated page of records plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub page_size: u32,
}

/// The raw `{ code, result, message }` wrapper every enveloped endpoint returns.
///
/// `result` is kept untyped here; the schema layer decides whether it is a
/// single record or a page and validates it accordingly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiEnvelope {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_id: Option<RecordId>,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub task_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Completing a task always records the day the work ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeasonRequest {
    pub season_name: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeasonRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SeasonStatus>,
}

//=========================================================================================
// List Parameters
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportListParams {
    pub status: Option<ReportStatus>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ToQueryParams for ReportListParams {
    fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert_opt("status", self.status.map(|s| s.as_str()));
        params.insert_opt("page", self.page);
        params.insert_opt("size", self.size);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListParams {
    pub season_id: Option<RecordId>,
    pub status: Option<TaskStatus>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ToQueryParams for TaskListParams {
    fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert_opt("seasonId", self.season_id);
        params.insert_opt("status", self.status.map(|s| s.as_str()));
        params.insert_opt("page", self.page);
        params.insert_opt("size", self.size);
        params
    }
}
