//! HTTP front end for the hashlink URL shortener.
//!
//! `POST /` stores the request body as a URL and answers with its short
//! link; `GET /<key>` answers with the stored URL. The [`bootstrap`] module
//! wires a storage backend to the router and runs the server.

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use config::Config;
pub use state::AppState;
