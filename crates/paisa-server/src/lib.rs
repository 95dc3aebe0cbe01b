//! Paisa Web Server
//!
//! Axum-based REST API exposing the monthly expense forecaster.
//!
//! The model artifact is loaded once at startup. When it cannot be loaded the
//! server still starts in a degraded mode where every forecast request is
//! answered with an explicit "model not loaded" error.

use std::path::Path;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use paisa_core::{Error as CoreError, ForecastConfig, ForecastModel};

mod handlers;

/// Message returned for every forecast while the model is unavailable
pub const MODEL_NOT_LOADED: &str = "Model not loaded. Check server logs.";

/// Startup outcome of loading the model artifact
#[derive(Debug, Clone)]
pub enum ModelState {
    Loaded(ForecastModel),
    Unavailable { reason: String },
}

impl ModelState {
    /// Load the artifact, degrading instead of failing
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("⚠️  No model artifact configured (set PAISA_MODEL_PATH or --model)");
            return Self::Unavailable {
                reason: "no model path configured".to_string(),
            };
        };

        match ForecastModel::load(path) {
            Ok(model) => {
                info!(
                    "✅ Forecast model loaded: {} ({} features: {})",
                    path.display(),
                    model.kind(),
                    model
                        .features()
                        .iter()
                        .map(|f| f.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                Self::Loaded(model)
            }
            Err(e) => {
                error!("Model artifact not usable at {}: {}", path.display(), e);
                warn!("⚠️  Starting in degraded mode - forecasts will report model not loaded");
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn model(&self) -> Option<&ForecastModel> {
        match self {
            Self::Loaded(model) => Some(model),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model().is_some()
    }
}

/// Shared application state
pub struct AppState {
    pub model: ModelState,
    pub config: ForecastConfig,
}

/// Create the application router
pub fn create_router(model: ModelState, config: ForecastConfig) -> Router {
    let cors = build_cors(&config.allowed_origins);

    let state = Arc::new(AppState { model, config });

    let api_routes = Router::new()
        .route("/forecast/monthly", post(handlers::forecast_monthly))
        .route("/health", get(handlers::health))
        .route("/model", get(handlers::model_info));

    Router::new()
        .nest("/api", api_routes)
        // Path used by existing mobile clients
        .route("/forecast/monthly", post(handlers::forecast_monthly))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        cors
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server with an already-loaded model state
pub async fn serve_with_model(
    model: ModelState,
    config: ForecastConfig,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let app = create_router(model, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error onto the HTTP taxonomy
    pub fn from_core(err: CoreError) -> Self {
        match err {
            CoreError::MalformedInput(msg) => Self::bad_request(&msg),
            CoreError::ModelUnavailable => Self::service_unavailable(MODEL_NOT_LOADED),
            CoreError::Prediction(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Forecast failed: the model could not produce a prediction".to_string(),
                internal: Some(err.into()),
            },
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
