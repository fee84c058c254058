//! scrawl-api - HTTP API server for scrawl

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use uuid::Uuid;

use scrawl_api::config::{AuthMode, Config};
use scrawl_api::services::{CreateNote, NotesService, UpdateNote, NOT_FOUND_MSG};
use scrawl_auth::{GoogleIdentityVerifier, InsecureVerifier};
use scrawl_core::{Identity, Note, TokenVerifier};
use scrawl_db::{Storage, StorageBackend};

// =============================================================================
// REQUEST ID
// =============================================================================

/// Generates UUID request correlation IDs for log correlation.
#[derive(Clone, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
///
/// Everything here is constructed once in `main` and injected; handlers
/// never reach for globals or re-read the environment.
#[derive(Clone)]
struct AppState {
    notes: NotesService,
    verifier: Arc<dyn TokenVerifier>,
}

/// OpenAPI documentation, served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Scrawl Notes API",
        version = "0.3.0",
        description = "A secure note-taking API with bearer-token authentication"
    ),
    paths(list_notes, create_note, get_note, update_note, delete_note, health_check),
    components(schemas(Note, CreateNote, UpdateNote)),
    tags(
        (name = "Notes", description = "Note CRUD operations"),
        (name = "System", description = "Health checks and system info")
    )
)]
struct ApiDoc;

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// Uniform response envelope.
///
/// Success: `{"type": true, "message": ..., "data": ...}`.
/// Failure (built in [`ApiError`]): `{"type": false, "message": ..., "data": null}`.
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    #[serde(rename = "type")]
    ok: bool,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(message: String, data: T) -> Self {
        Self {
            ok: true,
            message,
            data: Some(data),
        }
    }
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<scrawl_core::Error> for ApiError {
    fn from(err: scrawl_core::Error) -> Self {
        match err {
            scrawl_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            scrawl_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            scrawl_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            scrawl_core::Error::Internal(msg) => ApiError::Internal(msg),
            other => {
                // Raw causes are logged where they occur; the wire gets a
                // generic message only.
                tracing::error!(error = %other, "Unhandled internal error");
                ApiError::Internal(
                    "An unexpected error occurred. Please try again later.".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "type": false,
            "message": message,
            "data": null,
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// =============================================================================
// AUTHENTICATION EXTRACTOR
// =============================================================================

/// Extractor that resolves the bearer credential to an [`Identity`].
///
/// Rejects with 401 before the handler runs when the credential is
/// missing or the configured verifier rejects it.
struct RequireUser(Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|v| v.trim());

        let identity = state.verifier.verify(credential).await?;
        Ok(RequireUser(identity))
    }
}

/// Parse a note id from the path. Ids that cannot be note ids get the
/// same merged not-found failure as absent notes.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(NOT_FOUND_MSG.to_string()))
}

// =============================================================================
// NOTE HANDLERS
// =============================================================================

/// List all notes belonging to the authenticated user, newest first.
#[utoipa::path(
    get,
    path = "/api/notes",
    tag = "Notes",
    responses(
        (status = 200, description = "Notes retrieved"),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
async fn list_notes(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.notes.list(&user.user_id).await?;
    Ok(Json(ApiResponse::success(reply.message, reply.data)))
}

/// Create a new note for the authenticated user.
#[utoipa::path(
    post,
    path = "/api/notes",
    tag = "Notes",
    request_body = CreateNote,
    responses(
        (status = 201, description = "Note created"),
        (status = 400, description = "Invalid title or content"),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
async fn create_note(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CreateNote>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.notes.create(body, &user.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(reply.message, reply.data)),
    ))
}

/// Fetch a single note by id.
#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    tag = "Notes",
    responses(
        (status = 200, description = "Note retrieved"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 404, description = "Note not found or not owned by the caller")
    )
)]
async fn get_note(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_note_id(&id)?;
    let reply = state.notes.get(id, &user.user_id).await?;
    Ok(Json(ApiResponse::success(reply.message, reply.data)))
}

/// Update a note's title and/or content.
#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    tag = "Notes",
    request_body = UpdateNote,
    responses(
        (status = 200, description = "Note updated"),
        (status = 400, description = "No fields supplied, or invalid title"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 404, description = "Note not found or not owned by the caller")
    )
)]
async fn update_note(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateNote>,
) -> Result<impl IntoResponse, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one field must be provided for update".to_string(),
        ));
    }

    let id = parse_note_id(&id)?;
    let reply = state.notes.update(id, body, &user.user_id).await?;
    Ok(Json(ApiResponse::success(reply.message, reply.data)))
}

/// Permanently delete a note.
#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    tag = "Notes",
    responses(
        (status = 200, description = "Note deleted"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 404, description = "Note not found or not owned by the caller")
    )
)]
async fn delete_note(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_note_id(&id)?;
    let reply = state.notes.delete(id, &user.user_id).await?;
    Ok(Json(ApiResponse::success(reply.message, reply.data)))
}

// =============================================================================
// SYSTEM HANDLERS
// =============================================================================

/// Service banner.
async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Scrawl API is running!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses((status = 200, description = "Service is healthy"))
)]
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "scrawl-api",
    }))
}

/// Generated OpenAPI document.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// =============================================================================
// STARTUP
// =============================================================================

fn parse_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "scrawl_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "scrawl_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("scrawl-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false)); // no ANSI in files
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = Config::from_env()?;

    // Connect the configured storage backend
    let storage = Storage::connect(&config.storage).await?;
    match &config.storage {
        StorageBackend::Postgres { .. } => {
            info!("Running database migrations...");
            storage.migrate().await?;
            info!("Database migrations complete");
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory note store; notes will not survive a restart");
        }
    }

    // Construct the configured identity verifier
    let verifier: Arc<dyn TokenVerifier> = match &config.auth {
        AuthMode::Google {
            project_id,
            api_key,
            endpoint,
        } => {
            info!(project_id = %project_id, "Identity provider configured");
            Arc::new(GoogleIdentityVerifier::with_base_url(
                endpoint.clone(),
                project_id.clone(),
                api_key.clone(),
            ))
        }
        AuthMode::Insecure => {
            warn!("AUTH_INSECURE is set: every bearer token resolves to the development user");
            Arc::new(InsecureVerifier::new())
        }
    };

    // Create app state
    let state = AppState {
        notes: NotesService::new(storage.notes.clone()),
        verifier,
    };

    // Build router
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/openapi.json", get(openapi_json))
        // Notes CRUD
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer({
            let allowed_origins = parse_allowed_origins(&config.allowed_origins);

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
        })
        // Notes are text; 1 MB is plenty
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
