pub mod catalog;
pub mod db;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod openapi;
pub mod reference;
pub mod reservation;
pub mod settings;
pub mod timezone;
pub mod validation;

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    create_booking, get_booking, healthz_live, healthz_ready, list_bookings, list_classes, root,
};
use sqlx::SqlitePool;
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::catalog::ClassCatalog;
use crate::ledger::BookingLedger;
use crate::openapi::ApiDoc;
use crate::reservation::ReservationEngine;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub pool: SqlitePool,
    pub catalog: ClassCatalog,
    pub ledger: BookingLedger,
    pub engine: ReservationEngine,
}

impl AppState {
    pub fn new(settings: Settings, pool: SqlitePool) -> Self {
        Self {
            catalog: ClassCatalog::new(pool.clone()),
            ledger: BookingLedger::new(pool.clone()),
            engine: ReservationEngine::new(pool.clone(), settings.reference_attempts),
            settings,
            pool,
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let pool = db::connect(&settings).await?;
    let state = AppState::new(settings, pool);

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!("Starting Fitness Studio Booking API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/classes/", get(list_classes))
        .route("/book/", post(create_booking))
        .route("/bookings/", get(list_bookings))
        .route("/bookings/{reference}/", get(get_booking))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(CorsLayer::permissive()).layer(trace_layer)
}
