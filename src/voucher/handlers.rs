use std::sync::Arc;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::cache::MutationOutcome;
use crate::document::{GeneratedDocument, Generator, GeneratorError, Validator, VoucherRequest};
use crate::metrics::RenderMode;
use crate::state::AppState;
use crate::voucher::model::DisbursementVoucher;
use crate::voucher::store::StoreError;
use crate::ErrorResponse;

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RenderQuery {
    /// Return a preview link instead of a download.
    #[serde(default)]
    pub preview: bool,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct PreviewResponse {
    pub id: Uuid,
    pub url: String,
    pub filename: String,
    pub pages: usize,
}

fn preview_url(id: &Uuid) -> String {
    format!("/api/vouchers/previews/{}", id)
}

fn pdf_response(document: &GeneratedDocument, disposition: DispositionType) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition,
            parameters: vec![DispositionParam::Filename(document.filename.clone())],
        })
        .body(document.pdf.clone())
}

/// Render off the async workers; layout and PDF writing are CPU-bound.
async fn generate(
    state: &web::Data<AppState>,
    request: VoucherRequest,
) -> Result<GeneratedDocument, HttpResponse> {
    let generator = Arc::clone(&state.generator);
    let number = request.voucher.voucher_number.clone();

    match web::block(move || generator.generate(&request)).await {
        Ok(Ok(document)) => Ok(document),
        Ok(Err(GeneratorError::Invalid(message))) => {
            warn!("Rejected voucher {}: {}", number, message);
            state.metrics.record_failure("validation");
            Err(HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message)))
        }
        Ok(Err(e)) => {
            error!("Failed to render voucher {}: {}", number, e);
            state.metrics.record_failure("pdf");
            Err(HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string())))
        }
        Err(e) => {
            error!("Render task for voucher {} did not complete: {}", number, e);
            state.metrics.record_failure("blocking");
            Err(HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Voucher rendering was interrupted")))
        }
    }
}

/// Download as an attachment, or park the PDF in the preview cache and
/// answer with its link.
async fn deliver(state: &web::Data<AppState>, document: GeneratedDocument, preview: bool) -> HttpResponse {
    let mode = RenderMode::from_preview_flag(preview);
    state.metrics.record_render(mode, document.page_count);

    if !preview {
        return pdf_response(&document, DispositionType::Attachment);
    }

    let id = Uuid::new_v4();
    let response = PreviewResponse {
        id,
        url: preview_url(&id),
        filename: document.filename.clone(),
        pages: document.page_count,
    };
    state.previews.insert(id, Arc::new(document)).await;
    debug!("Preview {} ready for {}", id, response.filename);
    HttpResponse::Created().json(response)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Voucher Service",
    post,
    path = "/vouchers/render",
    params(RenderQuery),
    request_body(content = VoucherRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Voucher PDF as an attachment"),
        (status = 201, description = "Preview created", body = PreviewResponse),
        (status = 400, description = "Voucher failed validation", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn render_voucher(
    state: web::Data<AppState>,
    query: web::Query<RenderQuery>,
    body: web::Json<VoucherRequest>,
) -> impl Responder {
    let request = body.into_inner();
    info!(
        "Executing render_voucher for voucher {} (preview: {})",
        request.voucher.voucher_number, query.preview
    );

    match generate(&state, request).await {
        Ok(document) => deliver(&state, document, query.preview).await,
        Err(response) => response,
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Voucher Service",
    get,
    path = "/vouchers/previews/{id}",
    params(("id" = Uuid, Path, description = "Preview id returned by the render endpoint")),
    responses(
        (status = 200, description = "Voucher PDF shown inline"),
        (status = 404, description = "Preview expired or unknown", body = ErrorResponse)
    )
)]
pub async fn get_preview(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    match state.previews.get(&id).await {
        Some(document) => pdf_response(&document, DispositionType::Inline),
        None => HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
            "Preview '{}' not found or expired",
            id
        ))),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Voucher Registry",
    get,
    path = "/vouchers",
    responses(
        (status = 200, description = "All saved vouchers", body = Vec<DisbursementVoucher>),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn list_vouchers(state: web::Data<AppState>) -> impl Responder {
    match state.registry.list().await {
        Ok(vouchers) => HttpResponse::Ok().json(vouchers),
        Err(e) => {
            error!("Failed to list vouchers: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Voucher Registry",
    post,
    path = "/vouchers",
    request_body(content = DisbursementVoucher, content_type = "application/json"),
    responses(
        (status = 201, description = "Voucher saved", body = DisbursementVoucher),
        (status = 400, description = "Voucher failed validation", body = ErrorResponse),
        (status = 409, description = "Voucher number already in use", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn create_voucher(
    state: web::Data<AppState>,
    body: web::Json<DisbursementVoucher>,
) -> impl Responder {
    let voucher = body.into_inner();
    info!("Executing create_voucher for {}", voucher.voucher_number);

    if let Err(message) = voucher.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message));
    }

    match state.registry.create(voucher).await {
        Ok(MutationOutcome::Committed(saved)) => HttpResponse::Created().json(saved),
        Ok(MutationOutcome::RolledBack { reason, .. }) => {
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&reason))
        }
        Err(StoreError::AlreadyExists(number)) => HttpResponse::Conflict().json(
            ErrorResponse::new("Conflict", &format!("Voucher '{}' already exists", number)),
        ),
        Err(e) => {
            error!("Failed to create voucher: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Voucher Registry",
    get,
    path = "/vouchers/{number}",
    params(("number" = String, Path, description = "Voucher number")),
    responses(
        (status = 200, description = "Saved voucher", body = DisbursementVoucher),
        (status = 404, description = "Voucher not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn get_voucher(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let number = path.into_inner();
    match state.registry.get(&number).await {
        Ok(Some(voucher)) => HttpResponse::Ok().json(voucher),
        Ok(None) => HttpResponse::NotFound()
            .json(ErrorResponse::not_found(&format!("Voucher '{}' not found", number))),
        Err(e) => {
            error!("Failed to load voucher {}: {}", number, e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Voucher Registry",
    put,
    path = "/vouchers/{number}",
    params(("number" = String, Path, description = "Voucher number")),
    request_body(content = DisbursementVoucher, content_type = "application/json"),
    responses(
        (status = 200, description = "Voucher updated", body = DisbursementVoucher),
        (status = 400, description = "Voucher failed validation", body = ErrorResponse),
        (status = 404, description = "Voucher not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn update_voucher(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<DisbursementVoucher>,
) -> impl Responder {
    let number = path.into_inner();
    let mut voucher = body.into_inner();
    info!("Executing update_voucher for {}", number);

    if voucher.voucher_number.trim().is_empty() {
        voucher.voucher_number = number.clone();
    } else if voucher.voucher_number != number {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
            "Voucher number '{}' in the body does not match '{}' in the path",
            voucher.voucher_number, number
        )));
    }

    if let Err(message) = voucher.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message));
    }

    match state.registry.exists(&number).await {
        Ok(true) => {}
        Ok(false) => {
            return HttpResponse::NotFound()
                .json(ErrorResponse::not_found(&format!("Voucher '{}' not found", number)))
        }
        Err(e) => {
            error!("Failed to load voucher {}: {}", number, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&e.to_string()));
        }
    }

    match state.registry.save(voucher).await {
        MutationOutcome::Committed(saved) => HttpResponse::Ok().json(saved),
        MutationOutcome::RolledBack { reason, .. } => {
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&reason))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Voucher Registry",
    delete,
    path = "/vouchers/{number}",
    params(("number" = String, Path, description = "Voucher number")),
    responses(
        (status = 204, description = "Voucher deleted"),
        (status = 404, description = "Voucher not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn delete_voucher(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let number = path.into_inner();
    info!("Executing delete_voucher for {}", number);

    match state.registry.exists(&number).await {
        Ok(true) => {}
        Ok(false) => {
            return HttpResponse::NotFound()
                .json(ErrorResponse::not_found(&format!("Voucher '{}' not found", number)))
        }
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&e.to_string()))
        }
    }

    match state.registry.delete(&number).await {
        MutationOutcome::Committed(_) => HttpResponse::NoContent().finish(),
        MutationOutcome::RolledBack { reason, .. } => {
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&reason))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Voucher Registry",
    get,
    path = "/vouchers/{number}/pdf",
    params(
        ("number" = String, Path, description = "Voucher number"),
        RenderQuery
    ),
    responses(
        (status = 200, description = "Voucher PDF as an attachment"),
        (status = 201, description = "Preview created", body = PreviewResponse),
        (status = 404, description = "Voucher not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn render_saved_voucher(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RenderQuery>,
) -> impl Responder {
    let number = path.into_inner();
    let voucher = match state.registry.get(&number).await {
        Ok(Some(voucher)) => voucher,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ErrorResponse::not_found(&format!("Voucher '{}' not found", number)))
        }
        Err(e) => {
            error!("Failed to load voucher {}: {}", number, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&e.to_string()));
        }
    };

    match generate(&state, voucher.into()).await {
        Ok(document) => deliver(&state, document, query.preview).await,
        Err(response) => response,
    }
}

/// Document counters in prometheus text format.
pub async fn document_metrics(state: web::Data<AppState>) -> impl Responder {
    match state.metrics.encode() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            error!("Failed to encode document metrics: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

/// Routes mounted under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/vouchers/render").route(web::post().to(render_voucher)))
        .service(web::resource("/vouchers/previews/{id}").route(web::get().to(get_preview)))
        .service(
            web::resource("/vouchers")
                .route(web::get().to(list_vouchers))
                .route(web::post().to(create_voucher)),
        )
        .service(
            web::resource("/vouchers/{number}")
                .route(web::get().to(get_voucher))
                .route(web::put().to(update_voucher))
                .route(web::delete().to(delete_voucher)),
        )
        .service(
            web::resource("/vouchers/{number}/pdf").route(web::get().to(render_saved_voucher)),
        );
}
