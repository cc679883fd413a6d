use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{Res, api, config::Settings, spotify::auth::Authenticator};

/// State shared by every request handler.
#[derive(Debug)]
pub struct AppState {
    pub auth: Authenticator,
    pub settings: Settings,
}

impl AppState {
    /// Builds the state from the loaded settings. Fails when the client
    /// credentials are missing.
    pub fn new(settings: Settings) -> Res<Self> {
        let auth = Authenticator::new(&settings, reqwest::Client::new())?;
        Ok(Self { auth, settings })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/download", get(api::download_page))
        .route("/download/json", get(api::download))
        // Only JSON is produced; the YAML link serves the same archive.
        .route("/download/yaml", get(api::download))
        .route("/health", get(api::health))
        .layer(Extension(state))
}

pub async fn bind(address: &str) -> Res<TcpListener> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| format!("Failed to parse server address {address}: {e}"))?;
    Ok(TcpListener::bind(addr).await?)
}

pub async fn start_api_server(listener: TcpListener, state: Arc<AppState>) -> Res<()> {
    tracing::info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
