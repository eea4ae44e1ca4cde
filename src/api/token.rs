use axum::{extract::State, response::Json};

use crate::{error::AppError, info, server::AppState, success, types::TokenResponse, warning};

pub async fn get_spotify_token(
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, AppError> {
    info!(
        "Attempting to get Spotify token ({})...",
        state.catalog.tokens().strategy().name()
    );

    let credential = state
        .catalog
        .tokens()
        .acquire_credential()
        .await
        .inspect_err(|e| warning!("Error retrieving Spotify token: {}", e))?;

    success!("Spotify token retrieved successfully.");
    Ok(Json(TokenResponse {
        access_token: credential.access_token,
        expires_in: credential.expires_in,
    }))
}
