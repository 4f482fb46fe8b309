//! Blocking-to-async bridge for the shell's output pipe.
//!
//! The merged stdout/stderr pipe is an ordinary blocking reader. The pump
//! drains it on a blocking thread and forwards chunks through a channel so
//! the session can await output with a deadline.

use std::io::Read;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

/// Default buffer size for reading shell output.
const READ_BUFFER_SIZE: usize = 4096;

/// One delivery from the pump: a chunk of bytes or a fatal read error.
///
/// End of stream is signalled by the channel closing.
pub type Chunk = std::io::Result<Vec<u8>>;

/// Output pump for the shell's read end.
pub struct OutputPump<R: Read + Send + 'static> {
    reader: R,
    tx: mpsc::Sender<Chunk>,
    buffer_size: usize,
}

impl<R: Read + Send + 'static> OutputPump<R> {
    /// Create a new pump forwarding into `tx`.
    pub fn new(reader: R, tx: mpsc::Sender<Chunk>) -> Self {
        Self {
            reader,
            tx,
            buffer_size: READ_BUFFER_SIZE,
        }
    }

    /// Create with custom buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Start the pump on a blocking thread.
    ///
    /// The pump stops when:
    /// - the pipe reaches EOF (the channel is closed without an error)
    /// - a non-retryable read error occurs (the error is sent first)
    /// - the receiver is dropped
    ///
    /// Interrupted reads are retried.
    pub fn spawn(self) -> JoinHandle<()> {
        let Self {
            mut reader,
            tx,
            buffer_size,
        } = self;

        tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; buffer_size];

            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        debug!("shell output: EOF");
                        break;
                    }
                    Ok(n) => {
                        trace!("shell output: read {} bytes", n);
                        if tx.blocking_send(Ok(buf[..n].to_vec())).is_err() {
                            debug!("shell output: receiver dropped");
                            break;
                        }
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        error!("shell output read error: {}", e);
                        let _ = tx.blocking_send(Err(e));
                        break;
                    }
                }
            }
        })
    }
}
