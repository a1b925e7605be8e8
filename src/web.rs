//! Axum-based HTTP server exposing the device's attributes and commands

use crate::config::LoggingConfig;
use crate::driver::{HeaterRange, Lakeshore335};
use crate::error::LakeshoreError;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod logs;

pub use logs::logs_stream;

#[derive(Clone)]
pub struct AppState {
    pub device: Arc<Mutex<Lakeshore335>>,
    /// Logging settings as loaded at startup; read without the device lock
    pub logging: Arc<LoggingConfig>,
}

impl AppState {
    pub fn new(device: Arc<Mutex<Lakeshore335>>, logging: LoggingConfig) -> Self {
        Self {
            device,
            logging: Arc::new(logging),
        }
    }
}

type ApiResult = std::result::Result<Json<serde_json::Value>, LakeshoreError>;

impl LakeshoreError {
    /// HTTP status an API caller sees for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LakeshoreError::Validation { .. } => StatusCode::BAD_REQUEST,
            e if e.is_not_connected() => StatusCode::SERVICE_UNAVAILABLE,
            LakeshoreError::Protocol { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LakeshoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            crate::logging::get_logger("web").warn(&format!("Request failed: {}", self));
        }
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

fn ok() -> ApiResult {
    Ok(Json(serde_json::json!({"ok": true})))
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ValueBody {
    pub value: f64,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HeaterRangeBody {
    /// 0=off, 1=low, 2=medium, 3=high
    pub value: i64,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WriteBody {
    pub command: String,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InputBody {
    /// 0=None, 1=Input A, 2=Input B
    pub input: i64,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RampBody {
    pub enable: bool,
    /// K/min; the sign is ignored
    pub rate: f64,
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/health", responses(
    (status = 200, description = "Service is healthy")
)))]
async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/status", responses(
    (status = 200, description = "Connection state and identity")
)))]
async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let dev = state.device.lock().await;
    Json(serde_json::json!({
        "state": dev.state(),
        "port": dev.config().serial.port,
        "baudrate": dev.config().serial.baudrate,
        "output": dev.read_output(),
        "identity": dev.identity(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/attributes", responses((status = 200))))]
async fn attributes(State(state): State<AppState>) -> impl IntoResponse {
    let mut dev = state.device.lock().await;
    Json(dev.snapshot().await)
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/attributes/inputa", responses((status = 200))))]
async fn input_a(State(state): State<AppState>) -> ApiResult {
    let value = state.device.lock().await.read_input_a().await?;
    Ok(Json(serde_json::json!({"value": value, "unit": "K"})))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/attributes/inputb", responses((status = 200))))]
async fn input_b(State(state): State<AppState>) -> ApiResult {
    let value = state.device.lock().await.read_input_b().await?;
    Ok(Json(serde_json::json!({"value": value, "unit": "K"})))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/attributes/output", responses((status = 200))))]
async fn output(State(state): State<AppState>) -> ApiResult {
    let value = state.device.lock().await.read_output();
    Ok(Json(serde_json::json!({"value": value})))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/attributes/heater_output", responses((status = 200))))]
async fn heater_output(State(state): State<AppState>) -> ApiResult {
    let value = state.device.lock().await.read_heater_output().await?;
    Ok(Json(serde_json::json!({"value": value, "unit": "%"})))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/attributes/setpoint", responses((status = 200))))]
async fn get_setpoint(State(state): State<AppState>) -> ApiResult {
    let value = state.device.lock().await.read_setpoint().await?;
    Ok(Json(serde_json::json!({"value": value, "unit": "K"})))
}

#[cfg_attr(feature = "openapi", utoipa::path(put, path = "/api/attributes/setpoint", request_body = ValueBody, responses((status = 200))))]
async fn put_setpoint(State(state): State<AppState>, Json(body): Json<ValueBody>) -> ApiResult {
    state.device.lock().await.write_setpoint(body.value).await?;
    ok()
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/attributes/heater_range", responses((status = 200))))]
async fn get_heater_range(State(state): State<AppState>) -> ApiResult {
    let range = state.device.lock().await.read_heater_range().await?;
    Ok(Json(serde_json::json!({"value": range.code(), "name": range.name()})))
}

#[cfg_attr(feature = "openapi", utoipa::path(put, path = "/api/attributes/heater_range", request_body = HeaterRangeBody, responses((status = 200), (status = 400))))]
async fn put_heater_range(
    State(state): State<AppState>,
    Json(body): Json<HeaterRangeBody>,
) -> ApiResult {
    let range = HeaterRange::try_from(body.value)?;
    state.device.lock().await.write_heater_range(range).await?;
    ok()
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/commands/write", request_body = WriteBody, responses((status = 200))))]
async fn write_command(State(state): State<AppState>, Json(body): Json<WriteBody>) -> ApiResult {
    let reply = state.device.lock().await.write_raw(&body.command).await?;
    Ok(Json(serde_json::json!({"reply": reply})))
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/commands/read", responses((status = 200))))]
async fn read_command(State(state): State<AppState>) -> ApiResult {
    let reply = state.device.lock().await.read_raw().await?;
    Ok(Json(serde_json::json!({"reply": reply})))
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/commands/loop_select_input", request_body = InputBody, responses((status = 200))))]
async fn loop_select_input(
    State(state): State<AppState>,
    Json(body): Json<InputBody>,
) -> ApiResult {
    state.device.lock().await.loop_select_input(body.input).await?;
    ok()
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/api/commands/ramp", request_body = RampBody, responses((status = 200))))]
async fn ramp(State(state): State<AppState>, Json(body): Json<RampBody>) -> ApiResult {
    state
        .device
        .lock()
        .await
        .ramp(body.enable, body.rate)
        .await?;
    ok()
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/config", responses((status = 200))))]
async fn get_config(State(state): State<AppState>) -> ApiResult {
    let dev = state.device.lock().await;
    Ok(Json(serde_json::to_value(dev.config())?))
}

#[cfg(feature = "openapi")]
#[utoipa::path(get, path = "/api/config/schema", responses((status = 200)))]
async fn get_config_schema() -> impl IntoResponse {
    let schema = schemars::schema_for!(crate::config::Config);
    Json(serde_json::to_value(&schema).unwrap_or(serde_json::json!({"error":"schema"})))
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        health, status, attributes,
        input_a, input_b, output, heater_output,
        get_setpoint, put_setpoint, get_heater_range, put_heater_range,
        write_command, read_command, loop_select_input, ramp,
        get_config, get_config_schema,
        logs::logs_tail, logs::logs_stream, logs::get_log_level, logs::put_log_level,
    ),
    components(schemas(ValueBody, HeaterRangeBody, WriteBody, InputBody, RampBody, logs::LevelBody)),
    tags((name = "lakeshore335", description = "Lake Shore 335 temperature controller API"))
)]
pub struct ApiDoc;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/attributes", get(attributes))
        .route("/api/attributes/inputa", get(input_a))
        .route("/api/attributes/inputb", get(input_b))
        .route("/api/attributes/output", get(output))
        .route("/api/attributes/heater_output", get(heater_output))
        .route(
            "/api/attributes/setpoint",
            get(get_setpoint).put(put_setpoint),
        )
        .route(
            "/api/attributes/heater_range",
            get(get_heater_range).put(put_heater_range),
        )
        .route("/api/commands/write", post(write_command))
        .route("/api/commands/read", post(read_command))
        .route("/api/commands/loop_select_input", post(loop_select_input))
        .route("/api/commands/ramp", post(ramp))
        .route("/api/config", get(get_config))
        .merge(logs::routes())
}

pub fn build_router(state: AppState) -> Router {
    let router = api_routes();

    #[cfg(feature = "openapi")]
    let router = {
        use utoipa::OpenApi;
        router
            .route("/api/config/schema", get(get_config_schema))
            .merge(
                utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()),
            )
    };

    router
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let router = build_router(state);

    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={}, port={}",
        host, port
    ));

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!("Invalid host '{}'; falling back to 127.0.0.1", host));
            ([127, 0, 0, 1], port).into()
        }
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (API /api)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router).await?;
    Ok(())
}
