use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod cache;
pub mod config;
pub mod document;
pub mod metrics;
pub mod state;
pub mod voucher;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::voucher::handlers::render_voucher,
        crate::voucher::handlers::get_preview,
        crate::voucher::handlers::list_vouchers,
        crate::voucher::handlers::create_voucher,
        crate::voucher::handlers::get_voucher,
        crate::voucher::handlers::update_voucher,
        crate::voucher::handlers::delete_voucher,
        crate::voucher::handlers::render_saved_voucher
    ),
    components(
        schemas(
            voucher::model::DisbursementVoucher,
            voucher::model::Particular,
            voucher::model::Signatory,
            voucher::model::Signatories,
            voucher::model::AccountingEntry,
            voucher::model::VoucherTotals,
            voucher::handlers::PreviewResponse,
            document::VoucherRequest,
            document::LogoOverrides,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Voucher Service", description = "Render disbursement vouchers to PDF."),
        (name = "Voucher Registry", description = "Saved voucher CRUD endpoints.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Localhost server")
    )
)]
pub struct ApiDoc;

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let app_state = match AppState::from_config(&config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to prepare voucher store at {}. Check VOUCHER_STORE_DIR. Error: {}",
                config.store_dir.display(),
                e
            );
            return Err(e.into());
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("barangay_voucher_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus metrics middleware: {}", e))?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(web::scope("/api").configure(voucher::handlers::config))
            .service(
                web::resource("/metrics/documents")
                    .route(web::get().to(voucher::handlers::document_metrics)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .backlog(1024)
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
