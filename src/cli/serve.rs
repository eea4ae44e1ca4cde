use crate::{cli::interrupt::spawn_interrupt_handler, error, info, server};

pub async fn serve() {
    let state = match server::AppState::from_env().await {
        Ok(state) => state,
        Err(e) => error!("Cannot initialize backend. Err: {}", e),
    };

    let strategy = state.catalog.tokens().strategy().name();
    info!("Spotify token strategy: {}", strategy);

    spawn_interrupt_handler(state.shutdown.clone());

    if let Err(e) = server::start_api_server(state).await {
        error!("Server stopped. Err: {}", e);
    }
}
