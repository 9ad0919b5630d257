//! On-demand backup relay for database clusters.
//!
//! A trigger names a cluster; the relay finds a live discovery endpoint,
//! looks up the cluster's online member, pulls that member's xbstream over
//! TCP and stores it as `<root>/<cluster>/<timestamp>.xbstream`.

pub mod backup;
pub mod capture;
pub mod cli;
pub mod discovery;
pub mod error;
pub mod web;

pub use error::{RelayError, RelayResult};
