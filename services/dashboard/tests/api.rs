mod common;

use agri_core::{
    Method, PlotStatusName, ReportListParams, ReportStatus, TransportError, ValidationError,
};
use common::*;
use dashboard_lib::api::{ApiError, PlotStatusApi, ReportApi, SoilTypeApi, TaskApi};
use dashboard_lib::config::ReferenceSource;
use serde_json::json;

#[tokio::test]
async fn static_plot_statuses_come_back_in_order_without_a_request() {
    let transport = MockTransport::new();
    let api = PlotStatusApi::new(transport.clone(), ReferenceSource::Static);

    let statuses = api.list_all().await.unwrap();

    let ids: Vec<i64> = statuses.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    let names: Vec<PlotStatusName> = statuses.iter().map(|s| s.status_name).collect();
    assert_eq!(
        names,
        vec![
            PlotStatusName::Available,
            PlotStatusName::Planned,
            PlotStatusName::Active,
            PlotStatusName::Resting,
            PlotStatusName::Inactive,
        ]
    );
    assert_eq!(transport.total_calls(), 0);
}

#[tokio::test]
async fn network_reference_source_is_validated_the_same_way() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        "/api/v1/soil-types",
        Ok(envelope(json!([
            {"id": 1, "soilName": "Clay"},
            {"id": 2, "soilName": "Loam", "description": "Balanced"},
        ]))),
    );
    transport.respond(
        Method::Get,
        "/api/v1/plot-statuses",
        Ok(json!([{"id": 1, "statusName": "FLOODED"}])),
    );

    let soils = SoilTypeApi::new(transport.clone(), ReferenceSource::Network)
        .list_all()
        .await
        .unwrap();
    assert_eq!(soils.len(), 2);
    assert_eq!(soils[1].soil_name, "Loam");

    let err = PlotStatusApi::new(transport.clone(), ReferenceSource::Network)
        .list_all()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::Item { index: 0, .. })
    ));
}

#[tokio::test]
async fn report_by_id_unwraps_the_envelope() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        "/api/v1/reports/42",
        Ok(envelope(report(42, "Aphids", "PENDING"))),
    );
    let api = ReportApi::new(transport.clone());

    let found = api.get_by_id(42).await.unwrap();

    assert_eq!(found.id, 42);
    assert_eq!(found.title, "Aphids");
    assert_eq!(found.status, ReportStatus::Pending);
    assert_eq!(found.reporter_name.as_deref(), Some("amina"));
}

#[tokio::test]
async fn report_not_found_is_a_rejection_not_a_validation_error() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        "/api/v1/reports/42",
        Ok(rejected(404, "Report not found")),
    );
    let api = ReportApi::new(transport);

    let err = api.get_by_id(42).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Rejected {
            code: 404,
            message: Some("Report not found".to_string()),
        }
    );
}

#[tokio::test]
async fn malformed_envelopes_fail_validation() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        "/api/v1/reports/1",
        Ok(json!({"code": 200, "result": null})),
    );
    transport.respond(
        Method::Get,
        "/api/v1/reports/2",
        Ok(envelope(json!({"id": 2, "title": "   ", "status": "PENDING"}))),
    );
    transport.respond(
        Method::Get,
        "/api/v1/reports/3",
        Ok(envelope(json!({"id": 3, "title": "Hail", "status": "ESCALATED"}))),
    );
    let api = ReportApi::new(transport);

    for id in 1..=3 {
        let err = api.get_by_id(id).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)), "report {}: {:?}", id, err);
    }
}

#[tokio::test]
async fn report_page_sends_filters_and_checks_pagination() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Get,
        REPORTS,
        Ok(envelope(page(vec![
            report(1, "Aphids", "PENDING"),
            report(2, "Blight", "PENDING"),
        ]))),
    );
    transport.respond(
        Method::Get,
        REPORTS,
        Ok(envelope(json!({
            "content": [report(1, "Aphids", "PENDING")],
            "totalElements": 1,
            "totalPages": 1,
            "currentPage": 4,
            "pageSize": 20,
        }))),
    );
    let api = ReportApi::new(transport.clone());
    let params = ReportListParams {
        status: Some(ReportStatus::Pending),
        page: Some(1),
        size: Some(20),
    };

    let found = api.list(&params).await.unwrap();
    assert_eq!(found.content.len(), 2);
    assert_eq!(found.total_elements, 2);

    let sent = &transport.requests()[0];
    let pairs = sent.params.to_pairs();
    assert!(pairs.contains(&("status".to_string(), "PENDING".to_string())));
    assert!(pairs.contains(&("page".to_string(), "1".to_string())));
    assert!(pairs.contains(&("size".to_string(), "20".to_string())));

    let err = api.list(&params).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::Page(_))));
}

#[tokio::test]
async fn status_update_patches_only_the_status() {
    let transport = MockTransport::new();
    transport.respond(
        Method::Patch,
        "/api/v1/reports/5",
        Ok(envelope(report(5, "Aphids", "RESOLVED"))),
    );
    let api = ReportApi::new(transport.clone());

    let updated = api.update_status(5, ReportStatus::Resolved).await.unwrap();

    assert_eq!(updated.status, ReportStatus::Resolved);
    let sent = &transport.requests()[0];
    assert_eq!(sent.method, Method::Patch);
    assert_eq!(sent.body, Some(json!({"status": "RESOLVED"})));
}

#[tokio::test]
async fn transport_failures_propagate_unchanged() {
    let transport = MockTransport::new();
    transport.respond(Method::Get, "/api/v1/tasks/3", Err(TransportError::Unauthorized));
    let api = TaskApi::new(transport);

    let err = api.get_by_id(3).await.unwrap_err();

    assert_eq!(err, ApiError::Transport(TransportError::Unauthorized));
    assert!(err.requires_sign_in());
    assert!(!err.is_retryable());
}
