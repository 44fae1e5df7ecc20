//! Operator Console
//!
//! Line-oriented output shared by the command interpreter and the telemetry
//! dispatch path, plus the stdin reader that feeds operator lines to the
//! interpreter.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::debug;

use crate::utils::error::AppResult;

/// Lines buffered between the stdin thread and the interpreter.
pub const INPUT_BUFFER: usize = 16;

/// Shared console writer. Each call writes and flushes under one lock so
/// prompts, warnings, and telemetry lines never interleave mid-line.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// A console that records everything written to it.
    pub fn capture() -> (Self, CaptureBuffer) {
        let buffer = CaptureBuffer::default();
        (Self::from_writer(buffer.clone()), buffer)
    }

    /// Write `text` followed by a newline.
    pub fn line(&self, text: impl AsRef<str>) {
        self.write(text.as_ref(), true);
    }

    /// Write `text` without a trailing newline.
    pub fn prompt(&self, text: impl AsRef<str>) {
        self.write(text.as_ref(), false);
    }

    fn write(&self, text: &str, newline: bool) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = write_flushed(&mut **out, text, newline) {
            debug!("console write failed: {}", e);
        }
    }
}

fn write_flushed(out: &mut dyn Write, text: &str, newline: bool) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    if newline {
        out.write_all(b"\n")?;
    }
    out.flush()
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// In-memory sink behind [`Console::capture`].
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read stdin on a dedicated thread and forward each line.
///
/// The channel closes at end of input. A pending read never holds up the
/// async runtime; the thread is left behind at process exit.
pub fn spawn_stdin_reader() -> AppResult<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(INPUT_BUFFER);
    std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!("stdin read failed: {}", e);
                        break;
                    }
                }
            }
            debug!("console input closed");
        })?;
    Ok(rx)
}
