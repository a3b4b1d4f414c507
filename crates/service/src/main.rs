use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{routing::get, Form, Router};
use serde::Deserialize;
use thiserror::Error;
use tokio::task;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use simid_core::heatmap::escape;
use simid_core::{
    render_svg, run, FileType, Palette, SimError, SimilarityReport, SimilarityRequest,
};

const HOME_PAGE: &str = include_str!("../../../ui/home.html");
const RESULT_PAGE: &str = include_str!("../../../ui/result.html");
const ERROR_PAGE: &str = include_str!("../../../ui/error.html");

struct AppState {
    config: ServiceConfig,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let config = load_service_config();
    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| config.server.bind.clone());
    let state = Arc::new(AppState { config });
    let app = Router::new()
        .route("/", get(serve_form).post(handle_compare))
        .with_state(state);
    let addr: SocketAddr = bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening" = %addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct ServiceConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    defaults: Defaults,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_bind")]
    bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

#[derive(Debug, Deserialize)]
struct Defaults {
    #[serde(default)]
    file_type: FileType,
    #[serde(default = "default_stem")]
    stem: bool,
    #[serde(default)]
    palette: Palette,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            file_type: FileType::default(),
            stem: default_stem(),
            palette: Palette::default(),
        }
    }
}

fn default_stem() -> bool {
    true
}

fn load_service_config() -> ServiceConfig {
    let config_path = std::env::var("SIMID_CONFIG").unwrap_or_else(|_| "simid.toml".to_string());
    read_service_config(Path::new(&config_path))
}

fn read_service_config(path: &Path) -> ServiceConfig {
    if !path.exists() {
        return ServiceConfig::default();
    }
    match fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "invalid config, using defaults");
            ServiceConfig::default()
        }),
        Err(err) => {
            warn!(path = %path.display(), %err, "unreadable config, using defaults");
            ServiceConfig::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CompareForm {
    #[serde(default)]
    path: String,
    filetype: Option<String>,
    stem: Option<String>,
    npalette: Option<String>,
}

async fn serve_form() -> Html<&'static str> {
    Html(HOME_PAGE)
}

async fn handle_compare(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CompareForm>,
) -> Result<Html<String>, AppError> {
    let (request, palette) = resolve_form(&form, &state.config.defaults)?;
    let job = request.clone();
    let report = task::spawn_blocking(move || run(&job))
        .await
        .map_err(AppError::internal)??;
    info!(
        directory = %request.directory.display(),
        documents = report.files.len(),
        palette = palette.label(),
        "comparison rendered"
    );
    Ok(Html(render_result(&request, &report, palette)))
}

fn resolve_form(
    form: &CompareForm,
    defaults: &Defaults,
) -> Result<(SimilarityRequest, Palette), AppError> {
    let file_type = match non_empty(&form.filetype) {
        Some(value) => value.parse::<FileType>().map_err(AppError::bad_request)?,
        None => defaults.file_type,
    };
    let stem = match form.stem.as_deref() {
        Some(value) => is_truthy(value),
        None => defaults.stem,
    };
    let palette = match non_empty(&form.npalette) {
        Some(value) => value.parse::<Palette>().map_err(AppError::bad_request)?,
        None => defaults.palette,
    };
    let request = SimilarityRequest::new(PathBuf::from(form.path.trim()), file_type).stem(stem);
    Ok((request, palette))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "yes" | "on" | "true" | "1"
    )
}

fn render_result(request: &SimilarityRequest, report: &SimilarityReport, palette: Palette) -> String {
    let mut rows = String::new();
    for row in report.table.iter() {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
            escape(&row.a),
            escape(&row.b),
            row.score
        ));
    }
    let directory = escape(&request.directory.display().to_string());
    let count = report.files.len().to_string();
    let heatmap = render_svg(&report.files, &report.table, palette);
    fill_template(
        RESULT_PAGE,
        &[
            ("directory", directory.as_str()),
            ("file_type", request.file_type.label()),
            ("stem", if request.stem { "on" } else { "off" }),
            ("count", count.as_str()),
            ("heatmap", heatmap.as_str()),
            ("rows", rows.as_str()),
        ],
    )
}

fn render_error(message: &str) -> String {
    fill_template(ERROR_PAGE, &[("message", escape(message).as_str())])
}

/// Substitutes `{{key}}` markers in one left-to-right pass. Inserted values
/// are never scanned again, so user-controlled text cannot expand markers.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Error)]
enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn bad_request<E: ToString>(msg: E) -> Self {
        Self::BadRequest(msg.to_string())
    }

    fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        match err {
            err if err.is_precondition() => Self::NotFound(err.to_string()),
            SimError::UnknownFileType(_) | SimError::UnknownPalette(_) => Self::bad_request(err),
            err => Self::internal(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Html(render_error(&msg))).into_response()
            }
            AppError::Internal(err) => {
                error!("internal_error" = %err);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
