use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Level;

/// Where log lines go. A full-screen session owns the terminal, so the
/// demo only logs to stderr when no file was given and stderr is
/// redirected by the caller.
#[derive(Clone, Debug)]
pub enum LogTarget {
    File(Arc<Mutex<File>>),
    Stderr,
    Discard,
}

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<Mutex<File>>),
    Stderr(io::Stderr),
    Discard,
}

impl DelegatingWriter {
    fn new(target: &LogTarget) -> Self {
        let inner = match target {
            LogTarget::File(file) => DelegatingInner::File(Arc::clone(file)),
            LogTarget::Stderr => DelegatingInner::Stderr(io::stderr()),
            LogTarget::Discard => DelegatingInner::Discard,
        };
        DelegatingWriter { inner }
    }
}

fn poisoned() -> io::Error {
    io::Error::other("log file lock poisoned")
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(f) => f.lock().map_err(|_| poisoned())?.write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
            DelegatingInner::Discard => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(f) => f.lock().map_err(|_| poisoned())?.flush(),
            DelegatingInner::Stderr(s) => s.flush(),
            DelegatingInner::Discard => Ok(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SubscriberMakeWriter {
    target: LogTarget,
}

impl SubscriberMakeWriter {
    pub fn new(target: LogTarget) -> Self {
        Self { target }
    }

    /// Append to `path`, creating it when missing.
    pub fn to_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(LogTarget::File(Arc::new(Mutex::new(file)))))
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new(&self.target)
    }
}

/// Install the global subscriber. Safe to call multiple times; subsequent
/// calls are no-ops.
pub fn init_default(writer: SubscriberMakeWriter, level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn file_writer_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.log");
        let make = SubscriberMakeWriter::to_file(&path).unwrap();
        make.make_writer().write_all(b"first\n").unwrap();
        let mut second = make.make_writer();
        second.write_all(b"second\n").unwrap();
        second.flush().unwrap();

        let mut contents = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn scoped_subscriber_writes_events_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let make = SubscriberMakeWriter::to_file(&path).unwrap();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(make)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(window = 3, "window opened");
        });
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("window opened"));
        assert!(contents.contains("window=3"));
    }

    #[test]
    fn discard_swallows_everything() {
        let make = SubscriberMakeWriter::new(LogTarget::Discard);
        assert_eq!(make.make_writer().write(b"gone").unwrap(), 4);
    }
}
