use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use slotbook::config::AppConfig;
use slotbook::db;
use slotbook::handlers;
use slotbook::services::notifications::{HttpEmailProvider, LogNotifier, Notifier};
use slotbook::services::reminders;
use slotbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let notifier: Box<dyn Notifier> = if config.mail_api_url.is_empty() {
        tracing::info!("MAIL_API_URL not set, emails will be logged and dropped");
        Box::new(LogNotifier)
    } else {
        anyhow::ensure!(
            !config.mail_api_key.is_empty(),
            "MAIL_API_KEY must be set when MAIL_API_URL is configured"
        );
        tracing::info!("using HTTP email provider (url: {})", config.mail_api_url);
        Box::new(HttpEmailProvider::new(
            config.mail_api_url.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
        ))
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifier,
    });

    tokio::spawn(reminders::run_reminder_loop(Arc::clone(&state)));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/appointments",
            post(handlers::appointments::create_appointment)
                .get(handlers::appointments::list_appointments),
        )
        .route(
            "/api/appointments/upcoming",
            get(handlers::appointments::upcoming_appointments),
        )
        .route(
            "/api/appointments/:id",
            get(handlers::appointments::get_appointment)
                .delete(handlers::appointments::cancel_appointment)
                .patch(handlers::appointments::update_appointment),
        )
        .route(
            "/api/appointments/:id/confirm-payment",
            post(handlers::appointments::confirm_payment),
        )
        .route(
            "/api/appointments/:id/documents",
            post(handlers::documents::upload_document).get(handlers::documents::list_documents),
        )
        .route(
            "/api/appointments/:id/calendar.ics",
            get(handlers::calendar::download_ics),
        )
        .route(
            "/api/availability/day/:date",
            get(handlers::availability::day_availability),
        )
        .route(
            "/api/availability/month/:year/:month",
            get(handlers::availability::month_availability),
        )
        .route(
            "/api/availability/block",
            post(handlers::availability::block_period),
        )
        .route(
            "/api/availability/block/:id",
            delete(handlers::availability::unblock_period),
        )
        .route(
            "/api/availability/blocked-periods",
            get(handlers::availability::list_blocked_periods),
        )
        .route("/api/slots", get(handlers::slots::available_slots))
        .route("/api/slots/generate", post(handlers::slots::generate_slots))
        .route("/api/slots/:id/block", post(handlers::slots::block_slot))
        .route("/api/slots/:id/unblock", post(handlers::slots::unblock_slot))
        .route(
            "/api/payments/webhook",
            post(handlers::payments::payment_webhook),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
