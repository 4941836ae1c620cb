use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, FromRequest, Multipart, Request, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use logongraph_api::{
    ApiError, DateFilterRequest, GraphEdgeDto, GraphNodeDto, GraphResponse, HighlightRequest,
    LayoutRequest, NodeId, NodeSummaryDto, UserFilterRequest,
};
use logongraph_app::AppController;
use serde::Serialize;
use specta::TypeCollection;
use specta_typescript::Typescript;
use std::net::SocketAddr;
use std::path::{Path as StdPath, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Layout used when an upload does not name one.
    #[arg(long, default_value = "grid")]
    default_layout: String,

    #[arg(long, default_value_t = 64)]
    max_upload_mb: usize,

    /// CSV export to import before accepting requests.
    #[arg(long)]
    preload: Option<PathBuf>,

    /// Write TypeScript bindings for the API types here on startup.
    #[arg(long)]
    types_out: Option<PathBuf>,

    #[arg(long)]
    types_only: bool,

    #[arg(long, default_value = "logongraph-ui/dist")]
    frontend_dist: PathBuf,

    #[arg(long)]
    skip_types_gen: bool,
}

impl Args {
    /// Bindings are only written when an output path is given.
    fn bindings_target(&self) -> Result<Option<&StdPath>> {
        if self.types_only && self.types_out.is_none() {
            anyhow::bail!("--types-only requires --types-out");
        }
        if self.skip_types_gen && !self.types_only {
            return Ok(None);
        }
        Ok(self.types_out.as_deref())
    }
}

struct ServerState {
    controller: AppController,
    default_layout: String,
}

#[derive(Debug)]
struct HttpError(ApiError);

type ApiResult<T> = Result<Json<T>, HttpError>;

impl From<ApiError> for HttpError {
    fn from(value: ApiError) -> Self {
        Self(value)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.0.code.as_str() {
            "invalid_argument" | "no_graph_data" | "layout_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.0)).into_response()
    }
}

/// `Json` whose rejections use the same error body as every other failure.
struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                warn!(error = %rejection.body_text(), "Rejected request body");
                HttpError(ApiError::invalid_argument(rejection.body_text()))
            })?;
        Ok(Self(value))
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if let Some(path) = args.bindings_target()? {
        write_typescript_bindings(path)?;
        info!(path = %path.display(), "Generated frontend API types");
    }
    if args.types_only {
        return Ok(());
    }

    let controller = AppController::new();
    if let Some(preload) = &args.preload {
        controller
            .import_path(preload, &args.default_layout)
            .map_err(|e| anyhow::anyhow!("{:?}", e))
            .with_context(|| format!("Failed to preload {}", preload.display()))?;
        info!(path = %preload.display(), "Preloaded logon export");
    }

    let state = Arc::new(ServerState {
        controller,
        default_layout: args.default_layout.clone(),
    });

    let mut app = router(state, args.max_upload_mb.saturating_mul(BYTES_PER_MB));

    if args.frontend_dist.exists() {
        let spa = ServeDir::new(&args.frontend_dist)
            .not_found_service(ServeFile::new(args.frontend_dist.join("index.html")));
        app = app.fallback_service(spa);
    }

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Failed to parse server address")?;
    info!(%addr, "Starting logon graph server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<ServerState>, upload_limit: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/highlight", post(highlight))
        .route("/nodes", get(list_nodes))
        .route("/full_graph", get(full_graph))
        .route("/filter", post(filter_by_date))
        .route("/filter_by_user", post(filter_by_user))
        .route("/layout", post(change_layout))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

fn collect_types() -> TypeCollection {
    let mut types = TypeCollection::default();

    types
        .register::<ApiError>()
        .register::<NodeId>()
        .register::<GraphNodeDto>()
        .register::<GraphEdgeDto>()
        .register::<GraphResponse>()
        .register::<NodeSummaryDto>()
        .register::<HighlightRequest>()
        .register::<DateFilterRequest>()
        .register::<UserFilterRequest>()
        .register::<LayoutRequest>();

    types
}

fn write_typescript_bindings(path: &StdPath) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "Failed to create type output directory: {}",
                parent.display()
            )
        })?;
    }

    let types = collect_types();
    Typescript::default()
        .export_to(path, &types)
        .with_context(|| format!("Failed to write TypeScript bindings to {}", path.display()))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn upload(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<GraphResponse> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Upload is not multipart");
        ApiError::invalid_argument("No file provided")
    })?;

    let mut file = None;
    let mut layout = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_argument(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid_argument(e.body_text()))?;
                file = Some(bytes);
            }
            Some("layout") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::invalid_argument(e.body_text()))?;
                layout = Some(text);
            }
            _ => {}
        }
    }

    let Some(file) = file else {
        warn!("Upload without a file field");
        return Err(ApiError::invalid_argument("No file provided").into());
    };
    let layout = layout.unwrap_or_else(|| state.default_layout.clone());

    state
        .controller
        .upload_csv(&file, &layout)
        .map(Json)
        .map_err(Into::into)
}

async fn highlight(
    State(state): State<Arc<ServerState>>,
    ApiJson(req): ApiJson<HighlightRequest>,
) -> ApiResult<GraphResponse> {
    state
        .controller
        .highlight(req)
        .map(Json)
        .map_err(Into::into)
}

async fn list_nodes(State(state): State<Arc<ServerState>>) -> ApiResult<Vec<NodeSummaryDto>> {
    state.controller.list_nodes().map(Json).map_err(Into::into)
}

async fn full_graph(State(state): State<Arc<ServerState>>) -> ApiResult<GraphResponse> {
    state.controller.full_graph().map(Json).map_err(Into::into)
}

async fn filter_by_date(
    State(state): State<Arc<ServerState>>,
    ApiJson(req): ApiJson<DateFilterRequest>,
) -> ApiResult<GraphResponse> {
    state
        .controller
        .filter_by_date(req)
        .map(Json)
        .map_err(Into::into)
}

async fn filter_by_user(
    State(state): State<Arc<ServerState>>,
    ApiJson(req): ApiJson<UserFilterRequest>,
) -> ApiResult<GraphResponse> {
    state
        .controller
        .filter_by_user(req)
        .map(Json)
        .map_err(Into::into)
}

async fn change_layout(
    State(state): State<Arc<ServerState>>,
    ApiJson(req): ApiJson<LayoutRequest>,
) -> ApiResult<GraphResponse> {
    state
        .controller
        .change_layout(req)
        .map(Json)
        .map_err(Into::into)
}
