//! Test logging: one quiet global subscriber, plus a per-thread JSON
//! capture for tests that assert on what the backend logs.

use std::io;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install the global test subscriber. Safe to call from every test.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, then `warn`.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuf {
    type Writer = SharedBuf;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Records JSON log lines emitted on the current thread until dropped.
///
/// Only the current thread is redirected. That covers an
/// `actix_web::test` app end to end, but not closures sent to
/// `spawn_blocking`.
pub struct LogCapture {
    buf: SharedBuf,
    _guard: DefaultGuard,
}

impl LogCapture {
    pub fn start() -> Self {
        let buf = SharedBuf::default();
        let subscriber = fmt()
            .json()
            .with_env_filter(EnvFilter::new("debug"))
            .with_writer(buf.clone())
            .with_ansi(false)
            .without_time()
            .finish();

        Self {
            buf,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    /// Every captured line, parsed.
    pub fn events(&self) -> Vec<Value> {
        let bytes = self.buf.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// First captured event whose message is `message`.
    pub fn find(&self, message: &str) -> Option<Value> {
        self.events()
            .into_iter()
            .find(|event| event["fields"]["message"] == message)
    }
}
