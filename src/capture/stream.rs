use super::artifact::create_artifact;
use crate::cli::RelayConfig;
use crate::error::{RelayError, RelayResult};
use chrono::Local;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Why the capture loop stopped.
///
/// The backup stream has no framing, so the member signals completion by
/// closing the connection. Every variant is reported next to the byte
/// count; none of them aborts the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// Peer closed the connection
    Closed,
    /// No data arrived within the read timeout
    TimedOut(Duration),
    /// Transport error while reading
    ReadFailed(String),
    /// Local file rejected the data
    WriteFailed(String),
}

impl StreamEnd {
    /// True when the peer ended the stream itself
    pub fn is_closed(&self) -> bool {
        matches!(self, StreamEnd::Closed)
    }
}

impl fmt::Display for StreamEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEnd::Closed => write!(f, "EOF"),
            StreamEnd::TimedOut(after) => write!(f, "read timed out after {}s", after.as_secs()),
            StreamEnd::ReadFailed(e) => write!(f, "read failed: {}", e),
            StreamEnd::WriteFailed(e) => write!(f, "write failed: {}", e),
        }
    }
}

/// Result of one capture
#[derive(Debug, Clone)]
pub struct CaptureReport {
    /// File the stream was written to
    pub path: PathBuf,
    /// Bytes written to the file
    pub bytes: u64,
    /// Condition that ended the transfer
    pub end: StreamEnd,
}

/// Pulls a member's backup stream into the backup root
#[derive(Debug, Clone)]
pub struct StreamCapturer {
    root: PathBuf,
    capture_port: u16,
    buffer_size: usize,
    read_timeout: Option<Duration>,
}

impl StreamCapturer {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            root: config.backup_root.clone(),
            capture_port: config.capture_port,
            buffer_size: config.buffer_size.max(1),
            read_timeout: config.read_timeout(),
        }
    }

    /// `host:port` for a member address, bracketing bare IPv6 hosts
    pub fn capture_address(&self, host: &str) -> String {
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.capture_port)
        } else {
            format!("{}:{}", host, self.capture_port)
        }
    }

    /// Dial `host` on the capture port and copy everything it sends into a
    /// new artifact under `<root>/<cluster>`.
    ///
    /// Connect and file creation failures are errors; whatever ends the
    /// copy loop afterwards is returned as [`StreamEnd`].
    pub async fn capture(&self, host: &str, cluster: &str) -> RelayResult<CaptureReport> {
        let address = self.capture_address(host);
        let mut stream = TcpStream::connect(&address)
            .await
            .map_err(|source| RelayError::Connect {
                address: address.clone(),
                source,
            })?;
        debug!("Connected to {}", address);

        let (path, mut file) =
            create_artifact(&self.root, cluster, Local::now().naive_local()).await?;
        info!("Dumping {} into {}", address, path.display());

        let (bytes, end) =
            copy_stream(&mut stream, &mut file, self.buffer_size, self.read_timeout).await;

        if let Err(e) = stream.shutdown().await {
            debug!("Closing connection to {}: {}", address, e);
        }

        if !end.is_closed() {
            warn!("Capture from {} ended early: {}", address, end);
        }

        Ok(CaptureReport { path, bytes, end })
    }
}

/// Copy `reader` into `writer` chunk by chunk until the reader stops.
///
/// Returns the number of bytes written and the condition that ended the
/// loop. A failed flush overrides a clean close.
pub async fn copy_stream<R, W>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: usize,
    read_timeout: Option<Duration>,
) -> (u64, StreamEnd)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut written: u64 = 0;

    let mut end = loop {
        let read = match read_timeout {
            Some(limit) => match tokio::time::timeout(limit, reader.read(&mut buf)).await {
                Ok(read) => read,
                Err(_) => break StreamEnd::TimedOut(limit),
            },
            None => reader.read(&mut buf).await,
        };

        match read {
            Ok(0) => break StreamEnd::Closed,
            Ok(n) => {
                if let Err(e) = write_chunk(writer, &buf[..n], &mut written).await {
                    break StreamEnd::WriteFailed(e.to_string());
                }
            }
            Err(e) => break StreamEnd::ReadFailed(e.to_string()),
        }
    };

    if let Err(e) = writer.flush().await {
        if end.is_closed() {
            end = StreamEnd::WriteFailed(e.to_string());
        }
    }

    (written, end)
}

/// Write `chunk` in full, counting every byte the writer accepted even when
/// a later write fails.
async fn write_chunk<W>(writer: &mut W, chunk: &[u8], written: &mut u64) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut offset = 0;
    while offset < chunk.len() {
        match writer.write(&chunk[offset..]).await? {
            0 => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "writer accepted no data",
                ))
            }
            n => {
                offset += n;
                *written += n as u64;
            }
        }
    }
    Ok(())
}
