//! Backup orchestration
//!
//! Sequences discovery resolution, member lookup and stream capture for one
//! cluster and renders the outcome line returned to the caller.

mod outcome;
mod runner;

pub use outcome::BackupOutcome;
pub use runner::{isolate, BackupRunner};
