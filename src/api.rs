//! REST API for the carton quoting service.
//!
//! Provides HTTP endpoints for the shipping-rate quote flow.
//! Uses Axum as the web framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::catalog;
use crate::config::{ApiConfig, OptimizerConfig};
use crate::model::{BoxTemplate, Item, SizeClass, ValidationError};
use crate::optimizer::{
    BoxInfo, BoxSource, FallbackReason, PackEvent, PackingConfig, PackingResult, SearchPass,
    Strategy, pack, pack_with_progress,
};
use crate::types::{Dims, validation};

#[derive(Clone)]
struct ApiState {
    optimizer_config: OptimizerConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>carton-pack API Docs</title>
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
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Optional per-request limits. Absent fields keep the service defaults.
#[derive(Deserialize, Clone, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackingOverrides {
    #[serde(default, alias = "max_weight_per_box")]
    #[schema(nullable = true, example = 145.0)]
    pub max_weight_per_box: Option<f64>,
    #[serde(default, alias = "max_length_plus_girth")]
    #[schema(nullable = true, example = 165.0)]
    pub max_length_plus_girth: Option<f64>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub strategy: Option<Strategy>,
}

impl PackingOverrides {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(limit) = self.max_weight_per_box {
            validation::validate_positive_limit(limit, "maxWeightPerBox")?;
        }
        if let Some(limit) = self.max_length_plus_girth {
            validation::validate_positive_limit(limit, "maxLengthPlusGirth")?;
        }
        Ok(())
    }

    fn apply_to(&self, mut config: PackingConfig) -> PackingConfig {
        if let Some(limit) = self.max_weight_per_box {
            config.max_weight_per_box = limit;
        }
        if let Some(limit) = self.max_length_plus_girth {
            config.max_length_plus_girth = limit;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        config
    }
}

#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "items": [
            { "quantity": 2, "weightLbs": 5.0, "length": 10.0, "width": 8.0, "height": 4.0 },
            { "quantity": 1, "weightLbs": 12.0 }
        ],
        "config": { "strategy": "balanced" }
    })
)]
pub struct PackRequest {
    pub items: Vec<Item>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub config: Option<PackingOverrides>,
}

#[derive(Debug)]
struct ValidatedPackRequest {
    items: Vec<Item>,
    overrides: PackingOverrides,
}

impl ValidatedPackRequest {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn into_parts(self, defaults: PackingConfig) -> (Vec<Item>, PackingConfig) {
        let config = self.overrides.apply_to(defaults);
        (self.items, config)
    }
}

#[derive(Debug)]
enum PackRequestValidationError {
    InvalidItem(usize, ValidationError),
    InvalidConfig(ValidationError),
}

impl PackRequest {
    fn into_validated(self) -> Result<ValidatedPackRequest, PackRequestValidationError> {
        for (idx, item) in self.items.iter().enumerate() {
            item.validate()
                .map_err(|err| PackRequestValidationError::InvalidItem(idx, err))?;
        }

        let overrides = self.config.unwrap_or_default();
        overrides
            .validate()
            .map_err(PackRequestValidationError::InvalidConfig)?;

        Ok(ValidatedPackRequest {
            items: self.items,
            overrides,
        })
    }
}

/// Response of the packing endpoint.
///
/// # Fields
/// * `total_weight` - Sum of all item weights in lb
/// * `total_volume` - Sum of fully dimensioned item volumes in cubic inches
/// * `strategy` - Strategy that produced the result
/// * `box` - Per-box figures for the rate request
/// * `bookable` - `false` when the box is an estimate rather than a catalog carton
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackResponse {
    pub total_weight: f64,
    pub total_volume: f64,
    pub strategy: Strategy,
    #[serde(rename = "box")]
    pub box_info: BoxInfo,
    pub bookable: bool,
}

impl PackResponse {
    pub fn from_packing_result(result: PackingResult) -> Self {
        let PackingResult {
            total_weight,
            total_volume,
            strategy,
            box_info,
        } = result;

        let bookable = box_info.is_catalog_match();
        Self {
            total_weight,
            total_volume,
            strategy,
            box_info,
            bookable,
        }
    }
}

/// Single carton of the static catalog.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    pub class: SizeClass,
    pub dims: Dims,
    pub max_weight: f64,
    pub volume: f64,
    pub length_plus_girth: f64,
    pub mid_size: bool,
}

impl From<&BoxTemplate> for CatalogEntry {
    fn from(template: &BoxTemplate) -> Self {
        Self {
            code: template.code.to_string(),
            name: template.name.to_string(),
            class: template.class,
            dims: template.dims,
            max_weight: template.max_weight,
            volume: catalog::volume(template),
            length_plus_girth: catalog::length_plus_girth(template),
            mid_size: catalog::is_mid_size(template),
        }
    }
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

fn packing_config_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid packing configuration",
        details,
    )
}

fn parse_pack_request(
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Result<ValidatedPackRequest, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return Err(json_deserialize_error(err)),
    };

    match payload.into_validated() {
        Ok(validated) => Ok(validated),
        Err(PackRequestValidationError::InvalidItem(idx, err)) => {
            Err(validation_error(format!("Item {}: {}", idx, err)))
        }
        Err(PackRequestValidationError::InvalidConfig(err)) => {
            Err(packing_config_error(err.to_string()))
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_pack, handle_pack_stream, handle_catalog),
    components(
        schemas(
            PackRequest,
            PackingOverrides,
            PackResponse,
            CatalogEntry,
            ErrorResponse,
            Item,
            Dims,
            SizeClass,
            Strategy,
            BoxInfo,
            BoxSource,
            PackEvent,
            SearchPass,
            FallbackReason
        )
    ),
    tags((name = "packing", description = "Endpoints for carton selection"))
)]
struct ApiDoc;

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        // API endpoints
        .route("/pack", post(handle_pack))
        .route("/pack_stream", post(handle_pack_stream))
        .route("/catalog", get(handle_catalog))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server on the configured address.
///
/// Blocks until the server is terminated.
pub async fn start_api_server(config: ApiConfig, optimizer_config: OptimizerConfig) {
    let state = ApiState { optimizer_config };
    let app = router(state);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Could not bind API server to {}: {}", addr, err);
            return;
        }
    };

    tracing::info!(
        "Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        tracing::info!("Local access: http://localhost:{}", config.port());
    }
    tracing::info!("API endpoints: POST /pack, POST /pack_stream, GET /catalog");
    tracing::info!("Documentation: GET /docs, GET /docs/openapi.json");

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("API server terminated with an error: {err}");
    }
}

/// Handler for POST /pack endpoint.
///
/// Computes the carton count and per-box figures for a shipment.
///
/// # Parameters
/// * `payload` - JSON payload with items and optional limit overrides
///
/// # Returns
/// JSON response with totals and the chosen box
#[utoipa::path(
    post,
    path = "/pack",
    request_body = PackRequest,
    responses(
        (status = 200, description = "Cartons selected", body = PackResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid items or packing configuration",
            body = ErrorResponse
        )
    ),
    tag = "packing"
)]
async fn handle_pack(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_pack_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let item_count = request.item_count();
    let (items, packing_config) = request.into_parts(state.optimizer_config.packing_config());

    tracing::info!(
        items = item_count,
        strategy = %packing_config.strategy,
        "New pack request"
    );
    let packing_result = pack(&items, packing_config);
    tracing::info!(
        boxes = packing_result.box_count(),
        template = packing_result.box_info.template_code.as_deref().unwrap_or("-"),
        weight_per_box = packing_result.box_info.weight_per_box,
        "Pack result"
    );

    let response = PackResponse::from_packing_result(packing_result);
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /pack_stream endpoint (SSE).
///
/// Streams pack events as Server-Sent Events (text/event-stream) and ends
/// with a `result` event carrying the same body as POST /pack.
#[utoipa::path(
    post,
    path = "/pack_stream",
    request_body = PackRequest,
    responses(
        (
            status = 200,
            description = "Streams pack events followed by the result",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid items or packing configuration",
            body = ErrorResponse
        )
    ),
    tag = "packing"
)]
async fn handle_pack_stream(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_pack_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (items, packing_config) = request.into_parts(state.optimizer_config.packing_config());
    let (tx, rx) = mpsc::channel::<Event>(32);

    tokio::task::spawn_blocking(move || {
        let result = pack_with_progress(&items, packing_config, |evt| {
            if let Ok(json) = serde_json::to_string(evt) {
                // A closed receiver only means the client went away.
                let _ = tx.blocking_send(Event::default().event("progress").data(json));
            }
        });
        let response = PackResponse::from_packing_result(result);
        if let Ok(json) = serde_json::to_string(&response) {
            let _ = tx.blocking_send(Event::default().event("result").data(json));
        }
    });

    let stream = ReceiverStream::new(rx).map(Ok::<_, std::convert::Infallible>);
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for GET /catalog endpoint.
///
/// Lists the standard cartons in search order.
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Standard cartons", body = [CatalogEntry])),
    tag = "packing"
)]
async fn handle_catalog() -> Json<Vec<CatalogEntry>> {
    Json(catalog::all().iter().map(CatalogEntry::from).collect())
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
