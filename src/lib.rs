//! spotfetch library
//!
//! Resolves Spotify tracks and playlists into song lists and fetches matching
//! audio from YouTube through `yt-dlp`. The same crate provides the HTTP
//! backend and the terminal client that talks to it.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the backend
//! - `audio` - search and transcode through external tools
//! - `cli` - terminal commands (backend and client)
//! - `config` - configuration from environment variables and `.env`
//! - `error` - error taxonomy and its HTTP mapping
//! - `management` - sequential batch orchestration
//! - `server` - router, shared state and server startup
//! - `spotify` - token acquisition and catalog resolution
//! - `types` - data structures and wire formats
//! - `utils` - URL parsing, queries and file names
//!
//! # Example
//!
//! ```
//! use spotfetch::{config, utils};
//!
//! #[tokio::main]
//! async fn main() -> spotfetch::Res<()> {
//!     config::load_env().await?;
//!     let reference = utils::parse_reference("spotify:track:4iV5W9uYEdYUVa79Axb7Rh")?;
//!     println!("{} {}", reference.kind, reference.id);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result alias for binary-level glue code.
///
/// Library operations return [`error::AppError`]; command and server startup
/// code mixes those with address parsing and socket errors, so they share
/// this boxed error type.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational line with a blue `o` bullet.
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// info!("Searching YouTube: {}", query);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Download complete: {}", path.display());
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line to stderr and exits with status 1.
///
/// Only for fatal conditions in commands, such as a backend that cannot
/// start. Request handlers never call it; they return an
/// [`AppError`](crate::error::AppError) instead.
///
/// # Example
///
/// ```
/// error!("Cannot initialize backend. Err: {}", e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line to stderr for recoverable problems.
///
/// Used for per-song failures, skipped playlist entries and other issues
/// that do not stop the current operation.
///
/// # Example
///
/// ```
/// warning!("Failed to fetch '{}': {}", record.name, e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
