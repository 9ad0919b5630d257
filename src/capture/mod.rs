//! Backup stream capture: dial the online member on the capture port and
//! persist everything it sends as a new `.xbstream` file.

mod artifact;
mod stream;
#[cfg(test)]
pub(crate) mod testing;

pub use artifact::{artifact_name, create_artifact, validate_cluster, ARTIFACT_EXTENSION};
pub use stream::{copy_stream, CaptureReport, StreamCapturer, StreamEnd};
