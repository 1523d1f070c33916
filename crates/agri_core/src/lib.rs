pub mod domain;
pub mod ports;
pub mod query_key;
pub mod schema;
pub mod selection;

pub use domain::{
    ApiEnvelope, CompleteTaskRequest, CreateReportRequest, CreateSeasonRequest, CreateTaskRequest,
    Identified, Page, PlotStatus, PlotStatusName, RecordId, Report, ReportListParams,
    ReportStatus, Season, SeasonStatus, SoilType, Task, TaskListParams, TaskStatus,
    UpdateReportRequest, UpdateSeasonRequest, UpdateTaskRequest,
};
pub use ports::{HttpRequest, HttpTransport, Method, StateError, TransportError, TransportResult};
pub use query_key::{EntityKeys, KeyPart, QueryKey, QueryParams, ToQueryParams};
pub use schema::{EnvelopeOutcome, Schema, ValidationError};
pub use selection::{Selection, SelectionMachine};
