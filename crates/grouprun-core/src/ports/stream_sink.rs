//! Output sink port for child stdout/stderr.

/// Receives bytes written by a child process to one of its output streams.
///
/// Chunks arrive in order but with arbitrary boundaries; a sink must not
/// assume a chunk is a complete line. Sinks are shared between runs of the
/// same spec, so they take `&self`.
pub trait StreamSink: Send + Sync {
    fn write_chunk(&self, chunk: &[u8]);
}
