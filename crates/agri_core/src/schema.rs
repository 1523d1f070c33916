//! crates/agri_core/src/schema.rs
//!
//! Runtime shape validation for everything the backend sends back.
//!
//! Responses are untrusted JSON. Each entity declares its shape through serde
//! and any extra rules through [`Schema::check`]; the functions here turn raw
//! values into verified records or fail with a [`ValidationError`]. Nothing in
//! this module performs I/O, so it is tested directly against literal payloads.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    ApiEnvelope, Identified, Page, PlotStatus, RecordId, Report, Season, SoilType, Task,
};

//=========================================================================================
// Validation Error
//=========================================================================================

/// The server payload does not match the shape the client expects.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{entity}: expected {expected}, got {found}")]
    WrongKind {
        entity: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{entity}: {reason}")]
    Shape { entity: &'static str, reason: String },
    #[error("{entity}: identifying key must be positive, got {id}")]
    NonPositiveId { entity: &'static str, id: RecordId },
    #[error("{entity}: field `{field}` {reason}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },
    #[error("{entity}[{index}]: {source}")]
    Item {
        entity: &'static str,
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
    #[error("page envelope: {0}")]
    Page(String),
    #[error("envelope: {0}")]
    Envelope(String),
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//=========================================================================================
// The Schema Trait
//=========================================================================================

/// A record type that can be validated from untyped JSON.
pub trait Schema: DeserializeOwned + Identified {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Entity-specific rules beyond field presence and primitive types.
    fn check(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            entity,
            field,
            reason: "must not be blank".to_string(),
        });
    }
    Ok(())
}

impl Schema for Report {
    const ENTITY: &'static str = "Report";

    fn check(&self) -> Result<(), ValidationError> {
        require_text(Self::ENTITY, "title", &self.title)
    }
}

impl Schema for SoilType {
    const ENTITY: &'static str = "SoilType";

    fn check(&self) -> Result<(), ValidationError> {
        require_text(Self::ENTITY, "soilName", &self.soil_name)
    }
}

impl Schema for PlotStatus {
    const ENTITY: &'static str = "PlotStatus";
}

impl Schema for Task {
    const ENTITY: &'static str = "Task";

    fn check(&self) -> Result<(), ValidationError> {
        require_text(Self::ENTITY, "taskName", &self.task_name)?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ValidationError::InvalidField {
                    entity: Self::ENTITY,
                    field: "endDate",
                    reason: format!("{} is before startDate {}", end, start),
                });
            }
        }
        Ok(())
    }
}

impl Schema for Season {
    const ENTITY: &'static str = "Season";

    fn check(&self) -> Result<(), ValidationError> {
        require_text(Self::ENTITY, "seasonName", &self.season_name)?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ValidationError::InvalidField {
                    entity: Self::ENTITY,
                    field: "endDate",
                    reason: format!("{} is before startDate {}", end, self.start_date),
                });
            }
        }
        Ok(())
    }
}

//=========================================================================================
// Parsing Entry Points
//=========================================================================================

/// Validates a single record.
pub fn parse_record<T: Schema>(value: Value) -> Result<T, ValidationError> {
    if !value.is_object() {
        return Err(ValidationError::WrongKind {
            entity: T::ENTITY,
            expected: "object",
            found: kind_of(&value),
        });
    }
    let record: T = serde_json::from_value(value).map_err(|e| ValidationError::Shape {
        entity: T::ENTITY,
        reason: e.to_string(),
    })?;
    if record.id() <= 0 {
        return Err(ValidationError::NonPositiveId {
            entity: T::ENTITY,
            id: record.id(),
        });
    }
    record.check()?;
    Ok(record)
}

/// Validates a bare JSON array of records.
pub fn parse_list<T: Schema>(value: Value) -> Result<Vec<T>, ValidationError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ValidationError::WrongKind {
                entity: T::ENTITY,
                expected: "array",
                found: kind_of(&other),
            })
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            parse_record(item).map_err(|e| ValidationError::Item {
                entity: T::ENTITY,
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    content: Vec<Value>,
    total_elements: u64,
    total_pages: u32,
    current_page: u32,
    page_size: u32,
}

/// Validates a page envelope and every record inside it.
///
/// Pages are numbered from 1. An empty result reports `totalPages = 0` and
/// may report page 0 or 1.
pub fn parse_page<T: Schema>(value: Value) -> Result<Page<T>, ValidationError> {
    if !value.is_object() {
        return Err(ValidationError::Page(format!(
            "expected object, got {}",
            kind_of(&value)
        )));
    }
    let raw: RawPage =
        serde_json::from_value(value).map_err(|e| ValidationError::Page(e.to_string()))?;

    if raw.content.len() as u64 > raw.page_size as u64 {
        return Err(ValidationError::Page(format!(
            "{} records exceed pageSize {}",
            raw.content.len(),
            raw.page_size
        )));
    }
    if raw.current_page == 0 && raw.total_pages > 0 {
        return Err(ValidationError::Page(format!(
            "currentPage 0 on a result with {} pages",
            raw.total_pages
        )));
    }
    if raw.current_page > raw.total_pages.max(1) {
        return Err(ValidationError::Page(format!(
            "currentPage {} is past totalPages {}",
            raw.current_page, raw.total_pages
        )));
    }
    if (raw.content.len() as u64) > raw.total_elements {
        return Err(ValidationError::Page(format!(
            "{} records exceed totalElements {}",
            raw.content.len(),
            raw.total_elements
        )));
    }

    let content = parse_list(Value::Array(raw.content))?;
    Ok(Page {
        content,
        total_elements: raw.total_elements,
        total_pages: raw.total_pages,
        current_page: raw.current_page,
        page_size: raw.page_size,
    })
}

//=========================================================================================
// API Envelope
//=========================================================================================

/// The outcome carried by a structurally valid API envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeOutcome {
    /// A success code with its (not yet validated) result.
    Success(Value),
    /// A non-success code; the backend refused the request.
    Rejected { code: i64, message: Option<String> },
}

/// Checks the `{ code, result, message }` wrapper without looking inside `result`.
///
/// A success code must carry a result; a failure code must not.
pub fn read_envelope(value: Value) -> Result<EnvelopeOutcome, ValidationError> {
    if !value.is_object() {
        return Err(ValidationError::Envelope(format!(
            "expected object, got {}",
            kind_of(&value)
        )));
    }
    let envelope: ApiEnvelope =
        serde_json::from_value(value).map_err(|e| ValidationError::Envelope(e.to_string()))?;

    let result = envelope.result.clone().filter(|v| !v.is_null());
    match (envelope.is_success(), result) {
        (true, Some(result)) => Ok(EnvelopeOutcome::Success(result)),
        (true, None) => Err(ValidationError::Envelope(format!(
            "code {} carries no result",
            envelope.code
        ))),
        (false, Some(_)) => Err(ValidationError::Envelope(format!(
            "failure code {} carries a populated result",
            envelope.code
        ))),
        (false, None) => Ok(EnvelopeOutcome::Rejected {
            code: envelope.code,
            message: envelope.message,
        }),
    }
}
