//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for desktop hosts
//! (macOS, Windows, Linux) — used by the simulator shell and by
//! integration tests that want real I/O.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `BackgroundTransferClient` using detached Tokio tasks — the desktop
//!   analog of an OS-managed background URL session: submitted downloads
//!   keep running regardless of what happens to the submitting component,
//!   and completions are delivered through a broadcast update stream
//! - `MediaFileStore` using `tokio::fs` rooted at a data directory
//! - `SettingsStore` using a SQLite-backed key-value table
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{LocalFileStore, ReqwestHttpClient, SqliteSettingsStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http = ReqwestHttpClient::new();
//!     let files = LocalFileStore::in_default_location();
//!     let settings = SqliteSettingsStore::in_memory().await.unwrap();
//!     // Hand these to core_runtime::config::CoreConfig
//! }
//! ```

mod filesystem;
mod http;
mod settings;

pub use filesystem::LocalFileStore;
pub use http::{ReqwestHttpClient, TokioTransferManager};
pub use settings::SqliteSettingsStore;
