//! # API Module
//!
//! This module provides the HTTP endpoints of the spotfetch backend. Each
//! endpoint is an async axum handler that receives the shared
//! [`AppState`](crate::server::AppState) and returns either a JSON body, a file
//! or a structured [`AppError`](crate::error::AppError).
//!
//! ## Endpoints
//!
//! ### Catalog
//!
//! - [`get_spotify_token`] - `GET /get_spotify_token`, returns a fresh bearer
//!   credential as `{ accessToken, expiresIn }`
//! - [`resolve`] - `POST /resolve` with `{ url }`, returns the songs behind a
//!   Spotify track or playlist URL
//!
//! ### Downloads
//!
//! - [`download_song`] - `POST /download_song` with `{ query }`, returns the
//!   MP3 as an attachment
//! - [`download_all`] - `POST /download_all` with `{ songs: [{ name, artist }] }`,
//!   returns `{ downloadedFiles, errors }`
//!
//! ### Monitoring
//!
//! - [`health`] - `GET /health`, returns status and version
//!
//! ## Error Responses
//!
//! Invalid bodies (missing fields, malformed JSON, empty lists) are answered
//! with `400` and `{ "error": "..." }`. Every other failure uses the status
//! mapping of [`AppError`](crate::error::AppError).

mod download;
mod health;
mod resolve;
mod token;

pub use download::{download_all, download_song};
pub use health::health;
pub use resolve::resolve;
pub use token::get_spotify_token;
