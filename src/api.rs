//! REST API for the loading estimator.
//!
//! Provides HTTP endpoints for communication with the embedded site.
//! Uses Axum as the web framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::OnceLock;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::advice;
use crate::catalog::{self, ContainerSpec, ContainerType};
use crate::config::{AdviceConfig, ApiConfig, EstimatorConfig};
use crate::estimator;
use crate::model::{
    CalculationResult, CalculationSettings, CargoSpec, Dimensions, LoadSummary, PackedItem,
    ValidationError,
};

#[derive(Clone)]
struct ApiState {
    estimator_config: EstimatorConfig,
    advice_config: AdviceConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>stowplan API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                const ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
                window.ui = ui;
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Embedded Web Assets (HTML, CSS, JS)
#[derive(RustEmbed)]
#[folder = "web/"]
struct WebAssets;

/// Cargo dimensions and weight as sent by the frontend.
#[derive(Deserialize, Clone, Copy, ToSchema)]
pub struct CargoRequest {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

impl CargoRequest {
    fn into_spec(self) -> Result<CargoSpec, ValidationError> {
        CargoSpec::new(
            Dimensions {
                length: self.length,
                width: self.width,
                height: self.height,
            },
            self.weight,
        )
    }
}

/// Optional overrides for the packing caps.
///
/// Omitted fields fall back to the defaults for the requested container;
/// out-of-range values are clamped, never rejected.
#[derive(Deserialize, Clone, Copy, Default, ToSchema)]
pub struct SettingsRequest {
    #[serde(default)]
    #[schema(nullable = true)]
    pub space_utilization: Option<u8>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub max_weight_limit: Option<f64>,
}

/// Request structure for the estimate endpoint.
#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "container": "40HQ",
        "cargo": { "length": 120.0, "width": 80.0, "height": 60.0, "weight": 45.0 },
        "settings": { "space_utilization": 95, "max_weight_limit": 26.0 }
    })
)]
pub struct EstimateRequest {
    pub container: ContainerType,
    pub cargo: CargoRequest,
    #[serde(default)]
    #[schema(nullable = true)]
    pub settings: Option<SettingsRequest>,
}

#[derive(Debug)]
struct ValidatedEstimateRequest {
    container: &'static ContainerSpec,
    cargo: CargoSpec,
    settings: CalculationSettings,
}

impl EstimateRequest {
    fn into_validated(
        self,
        defaults: &EstimatorConfig,
    ) -> Result<ValidatedEstimateRequest, ValidationError> {
        let container = catalog::spec(self.container);
        let cargo = self.cargo.into_spec()?;

        let mut settings = defaults.default_settings_for(container);
        if let Some(overrides) = self.settings {
            if let Some(space_utilization) = overrides.space_utilization {
                settings.space_utilization = space_utilization;
            }
            if let Some(max_weight_limit) = overrides.max_weight_limit {
                settings.max_weight_limit = max_weight_limit;
            }
        }

        Ok(ValidatedEstimateRequest {
            container,
            cargo,
            settings: settings.clamped_for(container),
        })
    }
}

/// Response structure for the advice endpoint.
#[derive(Serialize, ToSchema)]
pub struct AdviceResponse {
    pub advice: String,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn parse_estimate_request(
    payload: Result<Json<EstimateRequest>, JsonRejection>,
    defaults: &EstimatorConfig,
) -> Result<ValidatedEstimateRequest, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return Err(json_deserialize_error(err)),
    };

    payload
        .into_validated(defaults)
        .map_err(|err| validation_error(err.to_string()))
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_containers, handle_estimate, handle_advice),
    components(
        schemas(
            EstimateRequest,
            CargoRequest,
            SettingsRequest,
            CalculationResult,
            PackedItem,
            ContainerSpec,
            ContainerType,
            Dimensions,
            LoadSummary,
            AdviceResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "estimator", description = "Container loading estimation"),
        (name = "advice", description = "AI loading recommendations")
    )
)]
struct ApiDoc;

/// Starts the API server.
///
/// Configures CORS for cross-origin requests from the frontend.
/// Blocks until the server is terminated.
pub async fn start_api_server(
    config: ApiConfig,
    estimator_config: EstimatorConfig,
    advice_config: AdviceConfig,
) {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState {
        estimator_config,
        advice_config,
    };

    let app = Router::new()
        // API endpoints
        .route("/containers", get(handle_containers))
        .route("/estimate", post(handle_estimate))
        .route("/advice", post(handle_advice))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        // Web-UI (embedded)
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_static))
        .layer(cors)
        .with_state(state);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            panic!("❌ Could not bind API server to {}: {}", addr, err);
        }
    };

    let display_host = config.display_host().to_string();
    println!(
        "🚀 Server running on http://{}:{}",
        display_host,
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        println!("💡 Local access: http://localhost:{}", config.port());
    }
    println!("🚢 API Endpoints:");
    println!("   - GET  /containers");
    println!("   - POST /estimate");
    println!("   - POST /advice");
    println!("📑 Documentation:");
    println!("   - GET /docs");
    println!("   - GET /docs/openapi.json");
    println!("🌐 Web-UI: http://{}:{}", display_host, config.port());

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("❌ API server terminated with an error: {err}");
    }
}

/// Handler for the GET /containers endpoint.
///
/// # Returns
/// The fixed catalog of supported containers, in display order.
#[utoipa::path(
    get,
    path = "/containers",
    responses(
        (status = 200, description = "Catalog of supported containers", body = [ContainerSpec])
    ),
    tag = "estimator"
)]
async fn handle_containers() -> impl IntoResponse {
    Json(catalog::all())
}

/// Handler for the POST /estimate endpoint.
///
/// Takes a container type, one cargo spec and optional cap overrides, and
/// computes the loading plan.
///
/// # Parameters
/// * `payload` - JSON payload with container, cargo and optional settings
///
/// # Returns
/// JSON response with counts, utilization figures and placements
#[utoipa::path(
    post,
    path = "/estimate",
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Computed loading plan", body = CalculationResult),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request data",
            body = ErrorResponse
        )
    ),
    tag = "estimator"
)]
async fn handle_estimate(
    State(state): State<ApiState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_estimate_request(payload, &state.estimator_config) {
        Ok(request) => request,
        Err(response) => return response,
    };

    println!(
        "📥 New estimate request: {} with {}×{}×{} cm @ {} kg",
        request.container.id,
        request.cargo.dimensions.length,
        request.cargo.dimensions.width,
        request.cargo.dimensions.height,
        request.cargo.weight
    );

    let result = estimator::compute(request.container, &request.cargo, &request.settings);

    println!(
        "📦 Result: {} boxes, {:.1}% volume, {:.1}% weight",
        result.total_count, result.volume_utilization_percent, result.weight_utilization_percent
    );

    (StatusCode::OK, Json(result)).into_response()
}

/// Handler for the POST /advice endpoint.
///
/// Forwards the summary figures to the text-generation service. Upstream
/// failures surface as fixed notices in a 200 response, never as a 5xx.
#[utoipa::path(
    post,
    path = "/advice",
    request_body = LoadSummary,
    responses(
        (status = 200, description = "Advisory text, or a static notice when degraded", body = AdviceResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request data",
            body = ErrorResponse
        )
    ),
    tag = "advice"
)]
async fn handle_advice(
    State(state): State<ApiState>,
    payload: Result<Json<LoadSummary>, JsonRejection>,
) -> impl IntoResponse {
    let Json(summary) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    let advice = advice::fetch_packing_advice(&state.advice_config, &summary).await;
    (StatusCode::OK, Json(AdviceResponse { advice })).into_response()
}

/// Serves the index.html main page
async fn serve_index() -> Response {
    match WebAssets::get("index.html") {
        Some(content) => Html(content.data).into_response(),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// Serves static assets (JS, CSS, etc.)
async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match WebAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
