use super::error::ApiError;
use crate::browse::{list_directory, DirEntry};
use crate::server::AppContext;
use crate::state::{JobId, JobRecord, JobRequest, JobSummary};
use alacforge_common::Error;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/list", get(list_dir))
        .route("/convert", post(convert))
        .route("/status/:job_id", get(job_status))
        .route("/jobs", get(list_jobs))
        .route("/tools", get(get_tools))
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    path: String,
}

async fn list_dir(
    State(ctx): State<AppContext>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<DirEntry>>, ApiError> {
    let entries = list_directory(ctx.runner.sandbox(), &params.path)?;
    Ok(Json(entries))
}

#[derive(Serialize, Deserialize)]
pub struct ConvertResponse {
    pub job_id: JobId,
}

async fn convert(
    State(ctx): State<AppContext>,
    Json(request): Json<JobRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    request.validate()?;

    let paths = request.paths.len();
    let job_id = ctx.runner.submit(request);
    tracing::info!("Queued job {} for {} selected paths", job_id, paths);

    Ok(Json(ConvertResponse { job_id }))
}

async fn job_status(
    State(ctx): State<AppContext>,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobRecord>, ApiError> {
    ctx.registry
        .get(job_id)
        .map(Json)
        .ok_or_else(|| Error::not_found("Job").into())
}

async fn list_jobs(State(ctx): State<AppContext>) -> Json<Vec<JobSummary>> {
    Json(ctx.registry.list())
}

#[derive(Serialize)]
struct ToolStatus {
    name: String,
    available: bool,
    version: Option<String>,
    path: Option<PathBuf>,
}

async fn get_tools(State(ctx): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    let ffmpeg = ctx.config.tools.ffmpeg_program();
    let tools = tokio::task::spawn_blocking(move || {
        alacforge_av::check_tools(&ffmpeg.to_string_lossy())
    })
    .await
    .map_err(|e| Error::internal(format!("tool check failed: {e}")))?;

    let statuses: Vec<ToolStatus> = tools
        .into_iter()
        .map(|t| ToolStatus {
            name: t.name,
            available: t.available,
            version: t.version,
            path: t.path,
        })
        .collect();
    Ok(Json(statuses))
}
