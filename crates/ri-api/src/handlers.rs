//! # ri-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use ri_core::error::AppError;
use ri_core::models::NewIllustration;
use ri_core::traits::{AuthProvider, IllustRepo};
use ri_ingest::IngestPipeline;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// State shared across all Actix-web workers. Every collaborator is built
/// once in the binary and injected here; handlers hold no globals.
pub struct AppState {
    pub pipeline: IngestPipeline,
    pub repo: Arc<dyn IllustRepo>,
    pub auth: Arc<dyn AuthProvider>,
}

/// The JSON body for `POST /illustrations`.
#[derive(Debug, Deserialize)]
pub struct CreateIllustRequest {
    pub title: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default = "default_true")]
    pub allow_comments: bool,
    /// Data-URI-encoded image payloads, one per submitted image.
    pub images: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Ingests a new illustration batch.
///
/// The response is produced as soon as the record is committed; scaling
/// tasks are dispatched best-effort and a broker outage is invisible here.
pub async fn create_illustration(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateIllustRequest>,
) -> impl Responder {
    let author_id = match authenticate(&data, &req).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let body = body.into_inner();
    let submission = NewIllustration {
        author_id,
        title: body.title,
        caption: body.caption,
        is_public: body.is_public,
        allow_comments: body.allow_comments,
        images: body.images,
    };

    match data.pipeline.ingest(submission).await {
        Ok(illust) => HttpResponse::Created().json(illust),
        Err(err) => error_response(&err),
    }
}

/// Fetches one illustration by ID.
pub async fn get_illustration(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    match data.repo.get_illust(id).await {
        Ok(Some(illust)) => HttpResponse::Ok().json(illust),
        Ok(None) => error_response(&AppError::NotFound("Illustration".into(), id.to_string())),
        Err(e) => error_response(&AppError::Internal(e.to_string())),
    }
}

/// Lists recent public illustrations, newest first.
pub async fn list_illustrations(data: web::Data<AppState>) -> impl Responder {
    match data.repo.list_recent(50).await {
        Ok(illusts) => HttpResponse::Ok().json(illusts),
        Err(e) => error_response(&AppError::Internal(e.to_string())),
    }
}

/// Resolves the bearer token to an author ID, or short-circuits with a 401.
async fn authenticate(
    data: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<Uuid, HttpResponse> {
    let unauthorized =
        |msg: &str| error_response(&AppError::Unauthorized(msg.to_string()));

    let token = match bearer_token(req) {
        Some(t) => t,
        None => return Err(unauthorized("missing bearer token")),
    };

    match data.auth.authenticate(token).await {
        Ok(Some(user_id)) => Ok(user_id),
        Ok(None) => Err(unauthorized("invalid token")),
        Err(e) => Err(error_response(&AppError::Internal(e.to_string()))),
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Maps the domain error taxonomy onto HTTP statuses. Malformed uploads are
/// the caller's fault; storage and infrastructure faults are ours.
pub fn error_response(err: &AppError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        AppError::MalformedContentType(_) | AppError::MalformedImageData(_) => {
            HttpResponse::BadRequest().json(body)
        }
        AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
        AppError::NotFound(_, _) => HttpResponse::NotFound().json(body),
        AppError::StorageFailure(_) | AppError::Internal(_) => {
            log::error!("request failed: {err}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}
