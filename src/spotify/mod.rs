//! # Spotify Integration Module
//!
//! This module is the integration layer between spotfetch and the Spotify
//! Web API. It turns a pasted track or playlist reference into a flat list of
//! [`MusicRecord`](crate::types::MusicRecord)s.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers (api)
//!          ↓
//! Catalog Resolver (catalog)
//!          ↓
//! Token Provider (auth)
//!          ↓
//! Spotify accounts service / Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication Module
//!
//! [`auth`] - Acquires bearer credentials with one of two strategies:
//! - **Client Credentials**: OAuth 2.0 exchange using a registered client id
//!   and secret, sent base64-encoded in a `Basic` authorization header
//! - **Web Player**: anonymous token from the public web-player endpoint,
//!   requested with a browser user agent
//!
//! The strategy is selected once at startup from `SPOTIFY_TOKEN_STRATEGY`.
//! Credentials are not cached; every resolution acquires a fresh one.
//!
//! ### Catalog Module
//!
//! [`catalog`] - Resolves references:
//! - `GET /playlists/{id}/tracks` with `next`-link pagination
//! - `GET /tracks/{id}`
//!
//! ## Error Handling
//!
//! All functions return [`AppError`](crate::error::AppError):
//! - **`Auth`** - the credential could not be acquired
//! - **`Upstream`** - the Web API answered with a non-success status
//! - **`MalformedResponse`** - the Web API answered with an unexpected shape
//!
//! Errors are always surfaced to the caller; a failed resolution never turns
//! into an empty list.

pub mod auth;
pub mod catalog;

pub use auth::{TokenProvider, TokenStrategy};
pub use catalog::CatalogResolver;
