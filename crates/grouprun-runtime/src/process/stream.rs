//! Child stdio plumbing.
//!
//! Output is copied as raw bytes: child programs can emit non-UTF8 data and
//! a sink decides for itself how to interpret it. The launcher joins every
//! output copy task before it returns, so a sink has seen all output by then.
//! Input feeders are aborted once the child has exited.

use std::sync::{Arc, Mutex, PoisonError};

use grouprun_core::StreamSink;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::ChildStdin;
use tokio::task::JoinHandle;
use tracing::debug;

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Copy everything `stream` yields into `sink` until EOF.
pub(crate) fn spawn_output_copier(
    stream: impl AsyncRead + Unpin + Send + 'static,
    sink: Arc<dyn StreamSink>,
    label: String,
    stream_type: &'static str,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = stream;
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];

        loop {
            match stream.read(&mut buf).await {
                Ok(0) => break, // EOF
                Ok(n) => sink.write_chunk(&buf[..n]),
                Err(e) => {
                    debug!(name = %label, %stream_type, error = %e, "output copier exiting due to read error");
                    break;
                }
            }
        }

        debug!(name = %label, %stream_type, "output copier task exiting");
    })
}

/// Write `data` to the child's stdin, then close it.
///
/// A child that exits without reading its input makes the write fail with
/// a broken pipe; that is logged and otherwise ignored.
pub(crate) fn spawn_input_feeder(
    mut stdin: ChildStdin,
    data: Arc<[u8]>,
    label: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = stdin.write_all(&data).await {
            debug!(name = %label, error = %e, "stdin feeder stopped early");
            return;
        }
        if let Err(e) = stdin.shutdown().await {
            debug!(name = %label, error = %e, "failed to close child stdin");
        }
    })
}

/// Copy `reader` into the child's stdin until EOF, then close it.
pub(crate) fn spawn_reader_feeder(
    mut stdin: ChildStdin,
    mut reader: Box<dyn AsyncRead + Send + Unpin>,
    label: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::io::copy(&mut reader, &mut stdin).await {
            Ok(bytes) => debug!(name = %label, bytes, "stdin reader drained"),
            Err(e) => {
                debug!(name = %label, error = %e, "stdin feeder stopped early");
                return;
            }
        }
        if let Err(e) = stdin.shutdown().await {
            debug!(name = %label, error = %e, "failed to close child stdin");
        }
    })
}

/// The stdio tasks belonging to one run.
#[derive(Debug, Default)]
pub(crate) struct StreamTasks {
    inputs: Vec<JoinHandle<()>>,
    outputs: Vec<JoinHandle<()>>,
}

impl StreamTasks {
    pub(crate) fn push_input(&mut self, task: JoinHandle<()>) {
        self.inputs.push(task);
    }

    pub(crate) fn push_output(&mut self, task: JoinHandle<()>) {
        self.outputs.push(task);
    }

    /// Stop feeding input and wait for every output copy to drain.
    ///
    /// A reader that never reaches EOF would otherwise keep the run alive
    /// after the child is gone.
    pub(crate) async fn join(self) {
        for task in self.inputs {
            task.abort();
        }
        for task in self.outputs {
            if let Err(e) = task.await {
                debug!(error = %e, "stdio task failed");
            }
        }
    }

    /// Stop copying without waiting.
    pub(crate) fn abort(self) {
        for task in self.inputs.into_iter().chain(self.outputs) {
            task.abort();
        }
    }
}

/// A sink that forwards complete lines to `tracing` at debug level.
///
/// Partial lines are held until their newline arrives; whatever is left
/// over is flushed when the sink is dropped.
#[derive(Debug)]
pub struct TracingSink {
    label: String,
    stream_type: &'static str,
    pending: Mutex<Vec<u8>>,
}

impl TracingSink {
    pub fn new(label: impl Into<String>, stream_type: &'static str) -> Self {
        Self {
            label: label.into(),
            stream_type,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn emit(&self, line: &[u8]) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let text = String::from_utf8_lossy(line);
        debug!(name = %self.label, stream_type = %self.stream_type, "{}: {}", self.stream_type, text);
    }
}

impl StreamSink for TracingSink {
    fn write_chunk(&self, chunk: &[u8]) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.extend_from_slice(chunk);

        while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            self.emit(&line[..line.len() - 1]);
        }
    }
}

impl Drop for TracingSink {
    fn drop(&mut self) {
        let pending = std::mem::take(
            self.pending
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if !pending.is_empty() {
            self.emit(&pending);
        }
    }
}
