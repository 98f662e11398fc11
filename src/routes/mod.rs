pub mod dashboard;
pub mod events;
pub mod health;
pub mod readings;
pub mod settings;

use axum::{
    Router,
    routing::{delete, get},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        readings::list_readings,
        readings::add_reading,
        readings::delete_readings,
        readings::get_reading,
        readings::update_reading,
        readings::delete_reading,
        readings::latest_reading,
        readings::current_reading,
        events::list_events,
        events::delete_event,
        events::list_reading_events,
        events::add_reading_event,
        events::delete_reading_events,
        settings::get_settings,
        settings::update_settings,
        dashboard::get_dashboard,
    ),
    components(
        schemas(
            crate::entity::readings::Model,
            crate::entity::events::Model,
            crate::store::readings::ReadingFields,
            crate::store::events::EventFields,
            crate::store::settings::SettingValue,
            crate::capture::worker::ReadingSample,
            readings::DeletedResponse,
            dashboard::CategoryStatus,
            dashboard::DashboardResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "readings", description = "Chemistry readings"),
        (name = "events", description = "Logged pool actions"),
        (name = "settings", description = "Persisted configuration"),
        (name = "dashboard", description = "Latest chemistry and water balance"),
    ),
    info(
        title = "Pool DB API",
        description = "Swimming-pool water chemistry tracker",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/readings",
            get(readings::list_readings)
                .post(readings::add_reading)
                .delete(readings::delete_readings),
        )
        .route("/readings/current", get(readings::current_reading))
        .route("/readings/latest/{field}", get(readings::latest_reading))
        .route(
            "/readings/{ts}",
            get(readings::get_reading)
                .put(readings::update_reading)
                .delete(readings::delete_reading),
        )
        .route(
            "/readings/{ts}/events",
            get(events::list_reading_events)
                .post(events::add_reading_event)
                .delete(events::delete_reading_events),
        )
        .route("/events", get(events::list_events))
        .route("/events/{event_id}", delete(events::delete_event))
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
        .layer(RequestBodyLimitLayer::new(64 * 1024)); // readings and settings are tiny

    // Health check routes
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
