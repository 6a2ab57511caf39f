use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::data::Catalog;

pub mod api;
pub mod page;
pub mod routes;

/// Read-only state shared by every request.
#[derive(Debug)]
pub struct AppState {
    pub catalog: Catalog,
    pub loaded_at: String,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            loaded_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: String,
) -> impl IntoResponse {
    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let response = routes::route_request(&state, method.as_str(), path, &body);
    debug!(%method, path, status = response.status_code, "handled request");
    response
}

pub fn run_server(bind_addr: &str, catalog: Catalog) -> std::io::Result<()> {
    let state = Arc::new(AppState::new(catalog));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(bind_addr, state))
}

async fn serve(bind_addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(
        villagers = state.catalog.len(),
        species = state.catalog.species_count(),
        "villager-odds listening on http://{bind_addr}"
    );
    axum::serve(listener, build_router(state)).await
}
