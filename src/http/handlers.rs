use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::{
    domain::{
        envelope::ApiResponse,
        transaction::Transaction,
        validation::{BODY_NOT_OBJECT, INVALID_ID},
    },
    errors::AppError,
    AppState,
};

pub const CREATED_MESSAGE: &str = "Transaction added successfully";
pub const UPDATED_MESSAGE: &str = "Transaction updated successfully";
pub const DELETED_MESSAGE: &str = "Transaction deleted successfully";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

type JsonResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Ids axum cannot decode, such as `%FF`, are malformed ids.
fn path_id(path: Result<Path<String>, PathRejection>) -> Result<String, AppError> {
    path.map(|Path(id)| id).map_err(|_| AppError::validation(INVALID_ID))
}

fn body_bytes(body: Result<Bytes, BytesRejection>) -> Result<Bytes, AppError> {
    body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge,
        _ => AppError::validation(BODY_NOT_OBJECT),
    })
}

pub async fn root() -> &'static str {
    "Expense Tracker API Ready"
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn list_transactions(State(state): State<AppState>) -> JsonResult<Vec<Transaction>> {
    let transactions = state.transactions.list().await?;
    Ok(Json(ApiResponse::ok(transactions)))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> JsonResult<Transaction> {
    let id = path_id(id)?;
    let transaction = state.transactions.get(&id).await?;
    Ok(Json(ApiResponse::ok(transaction)))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Transaction>>), AppError> {
    let body = body_bytes(body)?;
    let created = state.transactions.create(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(created).with_message(CREATED_MESSAGE)),
    ))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> JsonResult<Transaction> {
    let id = path_id(id)?;
    let body = body_bytes(body)?;
    let updated = state.transactions.update(&id, &body).await?;
    Ok(Json(ApiResponse::ok(updated).with_message(UPDATED_MESSAGE)))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> JsonResult<()> {
    let id = path_id(id)?;
    state.transactions.delete(&id).await?;
    Ok(Json(ApiResponse::acknowledged(DELETED_MESSAGE)))
}

pub async fn endpoint_not_found() -> AppError {
    AppError::RouteNotFound
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
