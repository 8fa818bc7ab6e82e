#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::downloader;
use crate::editor::Edit;
use crate::error::PapError;
use crate::graph;
use crate::loader::Upload;
use crate::pipeline::{RunOutcome, RunRequest, local_today, process};

/// Settings of the web host
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind: String,
    pub max_upload_bytes: usize,
}

#[derive(Deserialize)]
struct ExportQuery {
    format: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

#[derive(Serialize)]
struct ProcessResponse {
    status: String,
    #[serde(flatten)]
    outcome: RunOutcome,
    chart_svg: Option<String>,
}

/// Routes of the page and its two endpoints
///
/// No state is attached: every request carries the whole session.
pub fn router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(serve_page))
        .route("/api/process", post(process_upload))
        .route("/api/export", post(export_upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(config.max_upload_bytes);

    let listener = TcpListener::bind(&config.bind).await?;
    info!("Listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_page() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn process_upload(multipart: Multipart) -> Response {
    let request = match read_run_request(multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut outcome = match run_pipeline(request).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };

    let chart_svg = match &outcome.chart {
        Some(chart) => match graph::render_svg(chart) {
            Ok(svg) => Some(svg),
            Err(e) => {
                warn!("chart rendering failed: {}", e);
                outcome
                    .warnings
                    .push(format!("No se pudo dibujar el gráfico: {}", e));
                None
            }
        },
        None => None,
    };

    Json(ProcessResponse {
        status: "ok".to_string(),
        outcome,
        chart_svg,
    })
    .into_response()
}

async fn export_upload(Query(params): Query<ExportQuery>, multipart: Multipart) -> Response {
    let request = match read_run_request(multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let outcome = match run_pipeline(request).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };

    let (bytes, content_type, file_name) = match params.format.as_deref().unwrap_or("xlsx") {
        "csv" => (
            downloader::to_csv(&outcome.edited),
            "text/csv; charset=iso-8859-1",
            "pap_editado.csv",
        ),
        "xlsx" => (
            downloader::to_xlsx(&outcome.edited),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "pap_editado.xlsx",
        ),
        other => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Formato de exportación desconocido: {}", other),
            );
        }
    };

    match bytes {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file_name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            let err = PapError::Export(e.to_string());
            error!("{}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// Runs the synchronous pipeline off the async worker threads.
async fn run_pipeline(request: RunRequest) -> Result<RunOutcome, Response> {
    let result = tokio::task::spawn_blocking(move || process(&request))
        .await
        .map_err(|e| {
            error!("pipeline task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    result.map_err(|e| {
        info!("run halted: {}", e);
        error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })
}

/// Collect the multipart form sent by the page into a run request
///
/// Fields: `file` (required), `today` (`yyyy-mm-dd`, defaults to the host's
/// date), `selection` and `edits` (JSON), `chart` (`true` to aggregate).
async fn read_run_request(mut multipart: Multipart) -> Result<RunRequest, Response> {
    let mut upload = None;
    let mut today = None;
    let mut selection: Vec<String> = Vec::new();
    let mut edits: Vec<Edit> = Vec::new();
    let mut chart = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        let field_name = field.name().unwrap_or("unknown").to_string();

        if field_name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
            upload = Some(Upload::new(file_name, bytes.to_vec()));
            continue;
        }

        let text = field.text().await.map_err(|e| bad_request(e.to_string()))?;
        let text = text.trim();
        match field_name.as_str() {
            "today" if !text.is_empty() => {
                today = Some(
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .map_err(|e| bad_request(format!("Fecha inválida '{}': {}", text, e)))?,
                );
            }
            "selection" if !text.is_empty() => {
                selection = serde_json::from_str(text)
                    .map_err(|e| bad_request(format!("Selección inválida: {}", e)))?;
            }
            "edits" if !text.is_empty() => {
                edits = serde_json::from_str(text)
                    .map_err(|e| bad_request(format!("Ediciones inválidas: {}", e)))?;
            }
            "chart" => chart = text == "true",
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| bad_request("No se recibió ningún archivo".to_string()))?;
    let mut request = RunRequest::new(upload, today.unwrap_or_else(local_today));
    request.selection = selection;
    request.edits = edits;
    request.chart = chart;
    Ok(request)
}

fn bad_request(message: String) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            status: "error".to_string(),
            message,
        }),
    )
        .into_response()
}
