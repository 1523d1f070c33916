//! services/dashboard/src/bin/dashboard.rs

use std::sync::Arc;

use agri_core::{ReportListParams, ReportStatus, TaskListParams};
use dashboard_lib::{
    adapters::ReqwestTransport,
    api::ApiError,
    config::Config,
    context::AppContext,
    error::DashboardError,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(base_url = %config.api_base_url, "Configuration loaded. Starting dashboard...");

    // --- 2. Build the Transport, Cache & Context ---
    let transport = Arc::new(ReqwestTransport::new(
        config.api_base_url.clone(),
        config.api_token.clone(),
        config.http_timeout,
    )?);
    let mut context = AppContext::from_config(&config, transport);

    // --- 3. Resolve the Season Selection ---
    let mut selection = context.provide_season_selection(config.season_status_filter);
    let mut seasons = context.queries().seasons.list();
    if let Err(e) = seasons.wait().await {
        if e.requires_sign_in() {
            warn!("The backend rejected the configured credentials; set API_TOKEN and retry.");
        }
        return Err(e.into());
    }
    let state = selection
        .wait_until(|s| s.is_loaded())
        .await
        .map_err(ApiError::State)?;
    info!(seasons = state.seasons().len(), "Season list loaded.");

    let queries = context.queries().clone();
    let Some(season) = state.selected_season().cloned() else {
        warn!(
            status = config.season_status_filter.as_str(),
            "No season with the eligible status; nothing to summarize."
        );
        context.sign_out();
        return Ok(());
    };
    info!(season_id = season.id, name = %season.season_name, "Selected season.");

    // --- 4. Load the Dashboard Panels ---
    let task_params = TaskListParams {
        season_id: Some(season.id),
        page: Some(1),
        size: Some(20),
        ..Default::default()
    };
    let report_params = ReportListParams {
        status: Some(ReportStatus::Pending),
        page: Some(1),
        size: Some(20),
    };
    let (tasks, reports, plot_statuses, soil_types) = tokio::join!(
        queries.tasks.fetch_list(task_params),
        queries.reports.fetch_list(report_params),
        queries.plot_statuses.fetch_list(),
        queries.soil_types.fetch_list(),
    );

    let tasks = tasks?;
    info!(
        total = tasks.total_elements,
        page = tasks.current_page,
        pages = tasks.total_pages,
        "Tasks for the season."
    );
    for task in &tasks.content {
        info!(task_id = task.id, status = task.status.as_str(), "  {}", task.task_name);
    }

    match reports {
        Ok(reports) => info!(pending = reports.total_elements, "Reports awaiting review."),
        Err(e) => warn!(error = %e, "Reports are unavailable."),
    }

    let plot_statuses = plot_statuses?;
    let names: Vec<&str> = plot_statuses.iter().map(|s| s.status_name.as_str()).collect();
    info!(statuses = ?names, "Plot statuses.");

    let soil_types = soil_types?;
    let names: Vec<&str> = soil_types.iter().map(|s| s.soil_name.as_str()).collect();
    info!(soils = ?names, "Soil types.");

    drop(seasons);
    context.sign_out();
    info!("Dashboard summary complete.");
    Ok(())
}
