//! Standard stream bindings for a child process.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::AsyncRead;

use crate::ports::StreamSink;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Where a child's stdin comes from.
#[derive(Debug, Clone, Default)]
pub enum InputSource {
    /// Inherit the parent's stdin (the OS default).
    #[default]
    Inherit,
    /// Read from the null device.
    Null,
    /// Feed these bytes, then close stdin.
    Bytes(Arc<[u8]>),
    /// Read from a file, opened when the run starts.
    File(PathBuf),
    /// Copy from a reader while the child runs, then close stdin.
    Reader(StreamReader),
}

impl InputSource {
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(Arc::from(data.into()))
    }

    pub fn reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::Reader(StreamReader::new(reader))
    }
}

/// A byte stream handed to the first run that takes it.
///
/// A reader can only be drained once. Clones share it, and any run after the
/// one that took it sees an empty stdin.
#[derive(Clone)]
pub struct StreamReader {
    inner: Arc<Mutex<Option<BoxedReader>>>,
}

impl StreamReader {
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(Box::new(reader)))),
        }
    }

    /// Take the reader out, leaving nothing behind.
    pub fn take(&self) -> Option<BoxedReader> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Whether the reader has not been taken yet.
    pub fn is_available(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamReader")
            .field("available", &self.is_available())
            .finish()
    }
}

/// Where a child's stdout or stderr goes.
#[derive(Clone, Default)]
pub enum OutputTarget {
    /// Inherit the parent's stream (the OS default).
    #[default]
    Inherit,
    /// Discard all output.
    Null,
    /// Copy every byte into a sink.
    Sink(Arc<dyn StreamSink>),
}

impl OutputTarget {
    pub fn sink(sink: impl StreamSink + 'static) -> Self {
        Self::Sink(Arc::new(sink))
    }
}

impl fmt::Debug for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inherit => f.write_str("Inherit"),
            Self::Null => f.write_str("Null"),
            Self::Sink(_) => f.write_str("Sink(..)"),
        }
    }
}

/// In-memory sink collecting everything written to it.
///
/// Clones share the same buffer, so a test can keep one clone and hand
/// another to a [`crate::ProcessSpec`].
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the bytes captured so far.
    pub fn contents(&self) -> Vec<u8> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl StreamSink for CaptureBuffer {
    fn write_chunk(&self, chunk: &[u8]) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(chunk);
    }
}

impl From<CaptureBuffer> for OutputTarget {
    fn from(buffer: CaptureBuffer) -> Self {
        Self::sink(buffer)
    }
}
