use axum::{
    Router,
    routing::{get, post},
};
use browser::TableBrowser;
use catalog::ReportCatalog;
use configuration::Settings;
use database::Credentials;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
///
/// Holds no connection: every request that needs the database opens its own
/// session from `credentials` and closes it before responding.
pub struct AppState {
    pub credentials: Credentials,
    pub catalog: &'static ReportCatalog,
    pub browser: TableBrowser,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            credentials: settings.database.clone(),
            catalog: ReportCatalog::global(),
            browser: TableBrowser::new(settings.browser.max_rows),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/tables", get(handlers::list_tables))
        .route("/api/tables/:name", get(handlers::get_table))
        .route("/api/reports", get(handlers::list_sections))
        .route("/api/reports/run", post(handlers::run_report))
        .route("/api/reports/:section", get(handlers::list_reports))
        .route("/api/charts", get(handlers::list_charts))
        .route("/api/charts/:id", get(handlers::get_chart))
        .route("/api/forms", get(handlers::list_forms))
        .route("/api/forms/:entity", post(handlers::submit_form))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
/// Tracing must already be initialized by the caller.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.server.socket_addr()?;
    let app = build_router(Arc::new(AppState::new(&settings)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
