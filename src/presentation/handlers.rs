use crate::application::auth_service::AuthService;
use crate::application::record_service::RecordService;
use crate::data::memory::InMemoryRecordRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::models::{NewRecord, RecordPatch};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub auth_service: AuthService<InMemoryUserRepository>,
    pub record_service: RecordService<InMemoryRecordRepository>,
}

impl AppState {
    pub fn in_memory() -> Self {
        Self {
            auth_service: AuthService::new(Arc::new(InMemoryUserRepository::new())),
            record_service: RecordService::new(Arc::new(InMemoryRecordRepository::new())),
        }
    }
}

// The client shows `error` verbatim, so it carries the bare message.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.to_string();

        match self {
            ApiError::Internal(_) => error!(error = %message, status = %status, "Internal error"),
            _ => warn!(error = %message, status = %status, kind = self.kind(), "Request rejected"),
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: message,
            details: serde_json::json!({ "kind": self.kind() }),
        })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Unauthorized(msg)) => ApiError::Unauthorized(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[instrument(skip(state), fields(user_id = %*path))]
pub async fn list_records(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let records = state
        .record_service
        .list_by_owner(&user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list records");
            e
        })?;
    info!(count = records.len(), "Records listed");
    Ok(HttpResponse::Ok().json(records))
}

#[instrument(skip(state, req), fields(user_id = %req.owner_id, record_id = tracing::field::Empty))]
pub async fn create_record(
    state: web::Data<AppState>,
    req: web::Json<NewRecord>,
) -> Result<HttpResponse, ApiError> {
    let record = state
        .record_service
        .create(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create record");
            e
        })?;
    tracing::Span::current().record("record_id", record.id.as_str());
    Ok(HttpResponse::Ok().json(record))
}

#[instrument(skip(state, req), fields(record_id = %*path))]
pub async fn update_record(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RecordPatch>,
) -> Result<HttpResponse, ApiError> {
    let record_id = path.into_inner();
    let record = state
        .record_service
        .update(&record_id, req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update record");
            e
        })?;
    Ok(HttpResponse::Ok().json(record))
}

#[instrument(skip(state), fields(record_id = %*path))]
pub async fn delete_record(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let record_id = path.into_inner();
    let record = state
        .record_service
        .delete(&record_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to delete record");
            e
        })?;
    Ok(HttpResponse::Ok().json(record))
}
