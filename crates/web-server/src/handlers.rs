use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use catalog::{ChartData, ChartSpec, ReportSection};
use core_types::{QueryResult, TableName};
use database::PgSession;
use forms::{EntityKind, EntitySchema, FieldValues};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

async fn open_session(state: &AppState) -> Result<PgSession, AppError> {
    Ok(database::connect(&state.credentials).await?)
}

async fn close_session(session: PgSession) {
    if let Err(err) = session.close().await {
        tracing::warn!(error = %err, "Failed to close database session.");
    }
}

/// # GET /api/tables
pub async fn list_tables(State(state): State<Arc<AppState>>) -> Json<&'static [TableName]> {
    Json(state.browser.tables())
}

/// # GET /api/tables/:name
pub async fn get_table(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<QueryResult>, AppError> {
    // Unlisted names are rejected before a session is opened.
    state.browser.statement(&name)?;

    let mut session = open_session(&state).await?;
    let result = state.browser.fetch_table(&mut session, &name).await;
    close_session(session).await;
    Ok(Json(result?))
}

/// # GET /api/reports
/// The whole catalog: sections, titles, parameters and SQL.
pub async fn list_sections(State(state): State<Arc<AppState>>) -> Json<&'static [ReportSection]> {
    Json(state.catalog.sections())
}

/// # GET /api/reports/:section
pub async fn list_reports(
    Path(section): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<&'static str>>, AppError> {
    Ok(Json(state.catalog.list_reports(&section)?))
}

#[derive(Debug, Deserialize)]
pub struct RunReportRequest {
    pub section: String,
    pub title: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct RunReportResponse {
    pub id: &'static str,
    pub title: &'static str,
    pub result: QueryResult,
}

/// # POST /api/reports/run
pub async fn run_report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunReportRequest>,
) -> Result<Json<RunReportResponse>, AppError> {
    let report = state.catalog.report(&request.section, &request.title)?;
    report.bind(&request.params)?;

    let mut session = open_session(&state).await?;
    let result = state
        .catalog
        .run_report_with(&mut session, report.section, report.title, &request.params)
        .await;
    close_session(session).await;

    Ok(Json(RunReportResponse {
        id: report.id,
        title: report.title,
        result: result?,
    }))
}

/// # GET /api/charts
pub async fn list_charts(State(state): State<Arc<AppState>>) -> Json<&'static [ChartSpec]> {
    Json(state.catalog.charts())
}

/// # GET /api/charts/:id
pub async fn get_chart(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartData>, AppError> {
    state.catalog.chart(&id)?;

    let mut session = open_session(&state).await?;
    let data = state.catalog.chart_data(&mut session, &id).await;
    close_session(session).await;
    Ok(Json(data?))
}

/// # GET /api/forms
pub async fn list_forms() -> Json<&'static [EntitySchema]> {
    Json(forms::schemas())
}

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub entity: EntityKind,
    pub rows: u64,
}

/// # POST /api/forms/:entity
/// Accepts a flat JSON object of field values. Numbers and booleans are taken
/// as their text form; `null` counts as not provided.
pub async fn submit_form(
    Path(entity): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<BTreeMap<String, JsonValue>>,
) -> Result<(StatusCode, Json<InsertResponse>), AppError> {
    let kind: EntityKind = entity.parse()?;
    let record = forms::validate(kind, &form_values(body))?;
    let transaction = forms::build_transaction(kind, &record)?;

    let mut session = open_session(&state).await?;
    let rows = forms::submit(&mut session, &transaction).await;
    close_session(session).await;

    Ok((StatusCode::CREATED, Json(InsertResponse { entity: kind, rows: rows? })))
}

fn form_values(body: BTreeMap<String, JsonValue>) -> FieldValues {
    body.into_iter()
        .filter_map(|(name, value)| {
            let text = match value {
                JsonValue::Null => return None,
                JsonValue::String(s) => s,
                other => other.to_string(),
            };
            Some((name, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_become_form_text() {
        let body: BTreeMap<String, JsonValue> = serde_json::from_value(json!({
            "branch_id": 7,
            "city": "Valsad",
            "pincode": null,
        }))
        .unwrap();

        let values = form_values(body);
        assert_eq!(values.get("branch_id").map(String::as_str), Some("7"));
        assert_eq!(values.get("city").map(String::as_str), Some("Valsad"));
        assert!(!values.contains_key("pincode"));
    }
}
