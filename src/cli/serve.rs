use std::sync::Arc;

use crate::{
    config::Settings,
    error, info,
    server::{self, AppState},
    warning,
};

pub async fn serve(address: Option<String>, open: bool) {
    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };
    if let Some(address) = address {
        settings.server_address = address;
    }

    let state = match AppState::new(settings) {
        Ok(state) => state,
        Err(e) => error!("Cannot set up the oauth flow. Err: {}", e),
    };

    let listener = match server::bind(&state.settings.server_address).await {
        Ok(listener) => listener,
        Err(e) => error!("Cannot start server. Err: {}", e),
    };

    let url = match listener.local_addr() {
        Ok(addr) => format!("http://{}", addr),
        Err(e) => error!("Cannot read server address. Err: {}", e),
    };
    info!("Serving spotofile on {}", url);

    if open {
        if let Err(e) = webbrowser::open(&url) {
            warning!("Cannot open browser, visit {} manually. Err: {}", url, e);
        }
    }

    if let Err(e) = server::start_api_server(listener, Arc::new(state)).await {
        error!("Server stopped. Err: {}", e);
    }
}
