//! Single-endpoint dispatcher kept for the older front end, which sends every
//! call as `GET /exec?action=<name>&data=<json>` and may ask for JSONP by
//! adding `callback`.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::{
    dto::{auth::LoginRequest, orders::PlaceOrderRequest},
    error::{AppError, AppResult},
    middleware::auth::ensure_admin_key,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{auth_service, budget_service, order_service, throttle_service},
    state::AppState,
};

pub const ACTIONS: [&str; 6] = [
    "login",
    "order",
    "getOrders",
    "getBudget",
    "securityStatus",
    "resetLoginAttempts",
];

const MAX_CALLBACK_LEN: usize = 64;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExecQuery {
    /// One of the supported action names. Omit for service info.
    pub action: Option<String>,
    /// JSON-encoded action payload.
    pub data: Option<String>,
    /// JSONP callback name.
    pub callback: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub actions: Vec<String>,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserData {
    #[serde(default)]
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminData {
    admin_key: Option<String>,
    user_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/exec",
    params(ExecQuery),
    responses(
        (
            status = 200,
            description = "Service info, or the action's envelope (JSONP when a callback is set)",
            body = ApiResponse<ServiceInfo>
        ),
        (status = 400, description = "Invalid callback name")
    ),
    tag = "Exec"
)]
pub async fn exec(State(state): State<AppState>, Query(query): Query<ExecQuery>) -> Response {
    let callback = match query.callback.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(name) if !is_valid_callback(name) => {
            tracing::warn!(callback = name, "exec rejected: invalid callback");
            return AppError::Validation("Invalid callback name".into()).into_response();
        }
        other => other.map(str::to_string),
    };

    // Failures travel inside the envelope; the legacy client only reads the body.
    let body = match dispatch(&state, query.action.as_deref(), query.data.as_deref()).await {
        Ok(body) => body,
        Err(err) => serde_json::to_value(err.envelope()).unwrap_or_else(|_| {
            serde_json::json!({
                "status": "error",
                "message": err.to_string(),
                "data": null,
                "meta": null,
            })
        }),
    };

    match callback {
        Some(name) => (
            [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
            format!("{name}({body});"),
        )
            .into_response(),
        None => Json(body).into_response(),
    }
}

async fn dispatch(state: &AppState, action: Option<&str>, data: Option<&str>) -> AppResult<Value> {
    let Some(action) = action.map(str::trim).filter(|a| !a.is_empty()) else {
        return to_value(ApiResponse::success(
            "Kitchen budget API",
            service_info(state),
            Some(Meta::empty()),
        ));
    };
    let data = parse_data(data)?;
    tracing::debug!(action, "exec dispatch");

    match action {
        "login" => to_value(auth_service::login_user(state, payload::<LoginRequest>(data)?).await?),
        "order" => {
            let request: PlaceOrderRequest = payload(data)?;
            to_value(order_service::place_order(state, request).await?)
        }
        "getOrders" => {
            let query: OrderListQuery = payload(data)?;
            to_value(order_service::list_orders(state, query).await?)
        }
        "getBudget" => {
            let data: UserData = payload(data)?;
            to_value(budget_service::get_budget(state, &data.user_id).await?)
        }
        "securityStatus" => {
            let data: AdminData = payload(data)?;
            ensure_admin_key(state, data.admin_key.as_deref())?;
            let user_id = data.user_id.unwrap_or_default();
            to_value(throttle_service::security_status(state, &user_id).await?)
        }
        "resetLoginAttempts" => {
            let data: AdminData = payload(data)?;
            ensure_admin_key(state, data.admin_key.as_deref())?;
            to_value(throttle_service::reset_attempts(state, data.user_id.as_deref()).await?)
        }
        other => Err(AppError::Validation(format!("Unknown action: {other}"))),
    }
}

fn service_info(state: &AppState) -> ServiceInfo {
    ServiceInfo {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        actions: ACTIONS.iter().map(|a| a.to_string()).collect(),
        timestamp: state.clock.now(),
    }
}

fn parse_data(raw: Option<&str>) -> AppResult<Value> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|_| AppError::Validation("The data parameter is not valid JSON".into())),
        None => Ok(Value::Object(Default::default())),
    }
}

fn payload<T: DeserializeOwned>(data: Value) -> AppResult<T> {
    serde_json::from_value(data).map_err(|err| AppError::Validation(format!("Invalid data: {err}")))
}

fn to_value<T: Serialize>(resp: ApiResponse<T>) -> AppResult<Value> {
    serde_json::to_value(resp).map_err(|err| AppError::Internal(err.into()))
}

fn is_valid_callback(name: &str) -> bool {
    name.len() <= MAX_CALLBACK_LEN
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}
