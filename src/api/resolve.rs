use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};

use crate::{
    error::AppError,
    info,
    server::AppState,
    types::{ResolveRequest, ResolveResponse},
    utils, warning,
};

pub async fn resolve(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<ResolveResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let url = request
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing url parameter".to_string()))?;

    let reference = utils::parse_reference(&url)?;
    info!("Detected {} {}", reference.kind, reference.id);

    let songs = state
        .catalog
        .resolve_reference(&reference)
        .await
        .inspect_err(|e| warning!("Resolving {} {} failed: {}", reference.kind, reference.id, e))?;

    info!("Retrieved {} songs", songs.len());
    Ok(Json(ResolveResponse {
        kind: reference.kind,
        id: reference.id,
        songs,
    }))
}
