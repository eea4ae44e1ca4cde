//! # CLI Module
//!
//! This module provides the command-line layer of spotfetch. One binary plays
//! both roles of the application:
//!
//! - **Backend**: [`serve`] starts the HTTP server that resolves Spotify URLs
//!   and runs `yt-dlp`
//! - **Client**: [`list`] and [`download`] talk to a running backend over HTTP,
//!   render the song list as a table and save delivered files locally
//!
//! ## Command Categories
//!
//! ### Backend
//!
//! - [`serve`] - Binds `SERVER_ADDRESS` and serves until Ctrl-C
//!
//! ### Client
//!
//! - [`list`] - Resolves a URL and prints its songs
//! - [`download`] - Downloads selected rows with a spinner, or every row with
//!   a progress bar driven by the batch orchestrator
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotfetch serve
//! spotfetch list https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M
//! spotfetch download https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M --out music
//! spotfetch download spotify:track:4iV5W9uYEdYUVa79Axb7Rh --track 1
//! ```
//!
//! ## Error Presentation
//!
//! Fatal problems (unreachable backend, unresolvable URL) end the command with
//! a red `!` line. Per-song failures during a download are printed as
//! warnings and summarised at the end; they never abort the remaining songs.
//!
//! ## Interrupts
//!
//! The first Ctrl-C lets the current song finish and stops before the next
//! one; a second Ctrl-C exits immediately.

pub mod client;
mod download;
mod interrupt;
mod list;
mod serve;

pub use client::BackendClient;
pub use download::download;
pub use interrupt::{spawn_interrupt_handler, wait_for_interrupts};
pub use list::list;
pub use serve::serve;
