use super::AppState;
use super::error::ApiError;
use crate::application::service::ValidationOutcome;
use crate::domain::cab_request::CabRequest;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

type ApiResult = Result<Json<Value>, ApiError>;

fn success(data: Value) -> Json<Value> {
    Json(json!({ "status": "success", "data": data }))
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::fail(StatusCode::BAD_REQUEST, message)),
    }
}

#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    #[serde(rename = "phoneNumber")]
    phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pnumber: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    pnumber: Option<String>,
    pcode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequestCabQuery {
    #[serde(rename = "phoneNumber")]
    phone_number: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelQuery {
    #[serde(rename = "requestID")]
    request_id: Option<String>,
}

/// Wire shape of a cab request in `getrequestinfo` responses.
#[derive(Debug, Serialize)]
pub struct RequestView {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "requestedby")]
    pub requested_by: String,
    pub eta: String,
    pub status: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<CabRequest> for RequestView {
    fn from(request: CabRequest) -> Self {
        Self {
            id: request.id.to_hex(),
            from: request.from,
            to: request.to,
            requested_by: request.requested_by,
            eta: request.eta,
            status: request.status.code(),
            created_at: request.created_at,
        }
    }
}

pub async fn login(State(state): State<AppState>, Query(q): Query<PhoneQuery>) -> ApiResult {
    let phone = required(q.phone_number, "Phone number is required.")?;
    if state.service.login(&phone).await? {
        Ok(success(json!({ "status": 1 })))
    } else {
        Err(ApiError::fail(StatusCode::NOT_FOUND, "User not found."))
    }
}

pub async fn verify(State(state): State<AppState>, Query(q): Query<VerifyQuery>) -> ApiResult {
    let phone = required(q.pnumber, "Phone number is required.")?;
    let code = state.service.verify(&phone).await?;
    Ok(success(json!({ "status": 1, "code": code.value() })))
}

pub async fn validate(State(state): State<AppState>, Query(q): Query<ValidateQuery>) -> ApiResult {
    let message = "Phone number and code are required.";
    let phone = required(q.pnumber, message)?;
    let code = required(q.pcode, message)?;
    match state.service.validate(&phone, &code).await? {
        ValidationOutcome::Verified { .. } => Ok(success(json!({ "status": 1 }))),
        ValidationOutcome::Rejected => Err(ApiError::fail(
            StatusCode::UNAUTHORIZED,
            "Invalid phone number or verification code.",
        )),
    }
}

pub async fn request_cab(
    State(state): State<AppState>,
    Query(q): Query<RequestCabQuery>,
) -> ApiResult {
    let message = "Phone number, from, and to locations are required.";
    let phone = required(q.phone_number, message)?;
    let from = required(q.from, message)?;
    let to = required(q.to, message)?;
    let request = state.service.request_cab(&phone, &from, &to).await?;
    Ok(success(json!({ "status": 1, "id": request.id.to_hex() })))
}

pub async fn get_request_info(
    State(state): State<AppState>,
    Query(q): Query<PhoneQuery>,
) -> ApiResult {
    let phone = required(q.phone_number, "Phone number is required.")?;
    let request = state.service.request_info(&phone).await?;
    Ok(success(json!({ "request": RequestView::from(request) })))
}

pub async fn cancel_request(
    State(state): State<AppState>,
    Query(q): Query<CancelQuery>,
) -> ApiResult {
    let request_id = required(q.request_id, "Request ID is required.")?;
    state.service.cancel_request(&request_id).await?;
    Ok(success(json!({ "status": 1 })))
}
