//! HTTP surface of the relay
//!
//! Provides:
//! 1. The backup trigger - `GET|POST /backup.do?cluster=<id>`
//! 2. Read-only browsing and download of the backup root

mod handlers;
mod server;
mod state;

pub use server::{router, start_server};
pub use state::AppState;
