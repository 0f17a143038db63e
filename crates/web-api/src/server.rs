use crate::{dashboard, data_health, handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(dashboard::dashboard))
            .route("/api/tables", get(handlers::list_tables))
            .route("/api/tables/:name", get(handlers::query_table))
            .route("/api/tables/:name/columns", get(handlers::table_columns))
            .route("/api/filters", get(handlers::filter_options))
            .route("/api/reload", post(handlers::reload))
            .route("/api/data/health", get(data_health::data_health))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server on `addr` and stops accepting connections once
    /// `signal` resolves.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve_with_shutdown<F>(self, addr: &str, signal: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Dashboard listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await?;

        Ok(())
    }
}
