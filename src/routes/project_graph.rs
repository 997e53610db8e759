use crate::metrics::Weighting;
use crate::models::Project;
use crate::report;
use crate::routes::{internal_error, RouteError};
use crate::AppState;
use axum::http::StatusCode;
use std::collections::BTreeMap;

fn svg_response(svg_content: String) -> impl axum::response::IntoResponse {
    (
        [(axum::http::header::CONTENT_TYPE, "image/svg+xml")],
        svg_content,
    )
}

fn find_project<'a>(state: &'a AppState, name: &str) -> Result<&'a Project, RouteError> {
    state
        .projects
        .iter()
        .find(|project| project.name == name)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No project named {}", name)))
}

pub async fn issues_svg(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(project_name): axum::extract::Path<String>,
) -> Result<impl axum::response::IntoResponse, RouteError> {
    let project = find_project(&state, &project_name)?;
    let issues = state
        .collector
        .collect_issues(&project.query, true)
        .await
        .map_err(internal_error)?;
    let series = report::created_and_closed(&issues, &state.settings, Weighting::IssueCount)
        .map_err(internal_error)?;
    Ok(svg_response(report::issues_chart(project, &series, crate::today())))
}

pub async fn points_svg(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(project_name): axum::extract::Path<String>,
) -> Result<impl axum::response::IntoResponse, RouteError> {
    let project = find_project(&state, &project_name)?;
    let issues = state
        .collector
        .collect_issues(&project.query, true)
        .await
        .map_err(internal_error)?;
    let svg_content = report::points_chart(project, &issues, &state.settings, crate::today())
        .map_err(internal_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("{} has no dev days", project.name)))?;
    Ok(svg_response(svg_content))
}

pub async fn projects_svg(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<impl axum::response::IntoResponse, RouteError> {
    let today = crate::today();
    let mut all_progress = BTreeMap::new();
    for project in state.projects.iter() {
        let issues = state
            .collector
            .collect_issues(&project.query, true)
            .await
            .map_err(internal_error)?;
        if issues.is_empty() {
            continue;
        }
        let series = report::created_and_closed(&issues, &state.settings, Weighting::IssueCount)
            .map_err(internal_error)?;
        all_progress.insert(project.name.clone(), report::project_progress(project, &series, today));
    }
    Ok(svg_response(crate::progress_graph::render_projects(&all_progress)))
}
