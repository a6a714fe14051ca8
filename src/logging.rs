// src/logging.rs

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Append-only file shared by every worker. Each formatted event arrives as a
/// single write and is copied under the lock, so lines never interleave.
#[derive(Clone)]
struct LogSink(Arc<Mutex<BufWriter<File>>>);

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).flush()
    }
}

/// Process-wide log handle: created once at startup, handed to each worker,
/// flushed by [`Logging::shutdown`] when the batch is done.
pub struct Logging {
    dispatch: Dispatch,
    sink: LogSink,
}

impl Logging {
    /// `RUST_LOG` takes precedence over `default_filter`
    pub fn init(path: &Path, default_filter: &str) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let sink = LogSink(Arc::new(Mutex::new(BufWriter::new(file))));

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
        let writer = sink.clone();
        let subscriber = Registry::default()
            .with(filter)
            .with(fmt::layer().with_ansi(false).with_writer(move || writer.clone()));

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            sink,
        })
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn shutdown(self) -> io::Result<()> {
        let mut sink = self.sink;
        sink.flush()
    }
}
