//! Optional capture of raw provider responses.
//!
//! Adapters never write to disk on their own. A caller that wants raw bodies
//! for debugging injects a [`ResponseSink`]; capture failures are logged and
//! never change the outcome of a request.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::Endpoint;

const MAX_SUBJECT_LEN: usize = 64;

/// Destination for raw response bodies.
///
/// `open` and the returned writer are driven from tokio's blocking pool, so
/// implementations may do ordinary blocking file I/O.
pub trait ResponseSink: Send + Sync {
    /// Opens a writer for one response of `endpoint` about `subject`.
    fn open(&self, endpoint: Endpoint, subject: &str) -> io::Result<Box<dyn Write + Send>>;
}

/// Writes each response to `{dir}/{endpoint}-{subject}.json`, replacing any
/// earlier capture of the same request.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, endpoint: Endpoint, subject: &str) -> PathBuf {
        self.dir
            .join(format!("{}-{}.json", endpoint.as_str(), sanitize(subject)))
    }
}

impl ResponseSink for DirectorySink {
    fn open(&self, endpoint: Endpoint, subject: &str) -> io::Result<Box<dyn Write + Send>> {
        let file = File::create(self.path_for(endpoint, subject))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn sanitize(subject: &str) -> String {
    let cleaned = subject
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .take(MAX_SUBJECT_LEN)
        .collect::<String>();

    if cleaned.is_empty() {
        String::from("unnamed")
    } else {
        cleaned
    }
}

/// Per-response capture handle.
///
/// Sinks do blocking I/O, so the sink is opened and written on tokio's
/// blocking pool and the async side only hands chunks over. The first I/O
/// error disables the capture for the rest of the response.
pub(crate) struct CaptureWriter {
    chunks: Option<mpsc::UnboundedSender<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl CaptureWriter {
    pub(crate) fn start(
        sink: Option<&Arc<dyn ResponseSink>>,
        endpoint: Endpoint,
        subject: &str,
    ) -> Self {
        let Some(sink) = sink else {
            return Self {
                chunks: None,
                task: None,
            };
        };

        let sink = Arc::clone(sink);
        let subject = subject.to_owned();
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::task::spawn_blocking(move || {
            drain(sink.as_ref(), endpoint, &subject, receiver);
        });

        Self {
            chunks: Some(sender),
            task: Some(task),
        }
    }

    pub(crate) fn write(&mut self, chunk: &[u8]) {
        if let Some(chunks) = &self.chunks {
            // Closed once the writer has given up.
            if chunks.send(chunk.to_vec()).is_err() {
                self.chunks = None;
            }
        }
    }

    /// Closes the capture and waits until everything handed over is flushed.
    pub(crate) async fn finish(mut self) {
        self.chunks = None;
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                warn!(%error, "response capture task failed");
            }
        }
    }
}

fn drain(
    sink: &dyn ResponseSink,
    endpoint: Endpoint,
    subject: &str,
    mut chunks: mpsc::UnboundedReceiver<Vec<u8>>,
) {
    let mut writer = match sink.open(endpoint, subject) {
        Ok(writer) => writer,
        Err(error) => {
            warn!(%endpoint, %error, "could not open response capture");
            return;
        }
    };

    while let Some(chunk) = chunks.blocking_recv() {
        if let Err(error) = writer.write_all(&chunk) {
            warn!(%endpoint, %error, "response capture failed");
            return;
        }
    }

    if let Err(error) = writer.flush() {
        warn!(%endpoint, %error, "response capture flush failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    #[tokio::test]
    async fn directory_sink_writes_chunks_to_endpoint_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sink: Arc<dyn ResponseSink> =
            Arc::new(DirectorySink::new(dir.path().join("captures")).expect("sink dir"));

        let mut capture = CaptureWriter::start(Some(&sink), Endpoint::Intraday, "IBM");
        capture.write(b"{\"Meta Data\":");
        capture.write(b"{}}");
        capture.finish().await;

        let written = fs::read_to_string(dir.path().join("captures/intraday-IBM.json"))
            .expect("capture file exists");
        assert_eq!(written, "{\"Meta Data\":{}}");
    }

    #[test]
    fn subjects_are_sanitized_for_file_names() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sink = DirectorySink::new(dir.path()).expect("sink dir");
        let path = sink.path_for(Endpoint::BatchQuote, "^GSPC/1000");

        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("batch_quote-_GSPC_1000.json")
        );
    }

    #[tokio::test]
    async fn missing_sink_is_a_no_op() {
        let mut capture = CaptureWriter::start(None, Endpoint::Overview, "IBM");
        capture.write(b"ignored");
        capture.finish().await;
    }

    /// Records which thread performed each sink operation.
    struct ThreadRecordingSink {
        threads: Arc<Mutex<Vec<ThreadId>>>,
        fail_open: bool,
    }

    struct ThreadRecordingWriter {
        threads: Arc<Mutex<Vec<ThreadId>>>,
    }

    impl Write for ThreadRecordingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.threads.lock().expect("thread log").push(thread::current().id());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl ResponseSink for ThreadRecordingSink {
        fn open(&self, _: Endpoint, _: &str) -> io::Result<Box<dyn Write + Send>> {
            self.threads.lock().expect("thread log").push(thread::current().id());
            if self.fail_open {
                return Err(io::Error::other("read-only file system"));
            }
            Ok(Box::new(ThreadRecordingWriter {
                threads: Arc::clone(&self.threads),
            }))
        }
    }

    #[tokio::test]
    async fn sink_io_runs_off_the_async_thread() {
        let threads = Arc::new(Mutex::new(Vec::new()));
        let sink: Arc<dyn ResponseSink> = Arc::new(ThreadRecordingSink {
            threads: Arc::clone(&threads),
            fail_open: false,
        });

        let mut capture = CaptureWriter::start(Some(&sink), Endpoint::BatchQuote, "AAPL-1");
        capture.write(b"[");
        capture.write(b"]");
        capture.finish().await;

        let runtime_thread = thread::current().id();
        let threads = threads.lock().expect("thread log");
        assert_eq!(threads.len(), 3);
        assert!(threads.iter().all(|id| *id != runtime_thread));
    }

    #[tokio::test]
    async fn failing_sink_is_swallowed() {
        let threads = Arc::new(Mutex::new(Vec::new()));
        let sink: Arc<dyn ResponseSink> = Arc::new(ThreadRecordingSink {
            threads: Arc::clone(&threads),
            fail_open: true,
        });

        let mut capture = CaptureWriter::start(Some(&sink), Endpoint::Overview, "IBM");
        capture.write(b"{}");
        capture.write(b"{}");
        capture.finish().await;

        assert_eq!(threads.lock().expect("thread log").len(), 1);
    }
}
