//! Logging decorator for ports.
//!
//! [`Logged`] wraps the next implementation of a port and emits one event per
//! call: `debug` when the call succeeds, `warn` when it fails. The result is
//! handed back untouched.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

/// Port wrapper that logs every call.
pub struct Logged<T: ?Sized> {
    component: &'static str,
    next: Arc<T>,
}

impl<T: ?Sized> Logged<T> {
    /// Wrap `next`, tagging events with `component`.
    pub fn new(component: &'static str, next: Arc<T>) -> Self {
        Self { component, next }
    }

    /// The wrapped implementation.
    pub fn next(&self) -> &T {
        &self.next
    }

    /// Emit the outcome event for `operation`.
    pub fn observe<R, E: Display>(
        &self,
        operation: &'static str,
        started: Instant,
        result: &Result<R, E>,
    ) {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(_) => debug!(
                component = self.component,
                operation,
                elapsed_ms,
                "port call succeeded"
            ),
            Err(error) => warn!(
                component = self.component,
                operation,
                elapsed_ms,
                %error,
                "port call failed"
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod capture {
    //! In-memory log capture for decorator tests.

    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::subscriber::DefaultGuard;

    #[derive(Clone, Default)]
    pub(crate) struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        pub(crate) fn contents(&self) -> String {
            let bytes = self.0.lock().expect("capture lock").clone();
            String::from_utf8(bytes).expect("utf8 log output")
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("capture lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Install a thread-local JSON subscriber writing into the returned buffer.
    pub(crate) fn capture_logs() -> (Captured, DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        (captured, tracing::subscriber::set_default(subscriber))
    }
}

#[cfg(test)]
mod tests {
    use super::capture::capture_logs;
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn success_is_logged_at_debug() {
        let (logs, _guard) = capture_logs();
        let logged = Logged::new("contacts", Arc::new(()));
        logged.observe::<_, String>("create", Instant::now(), &Ok(()));

        let output = logs.contents();
        assert!(output.contains("\"level\":\"DEBUG\""));
        assert!(output.contains("\"component\":\"contacts\""));
        assert!(output.contains("\"operation\":\"create\""));
    }

    #[rstest]
    fn failure_is_logged_at_warn_with_error() {
        let (logs, _guard) = capture_logs();
        let logged = Logged::new("todos", Arc::new(()));
        logged.observe::<(), _>("delete", Instant::now(), &Err("row locked"));

        let output = logs.contents();
        assert!(output.contains("\"level\":\"WARN\""));
        assert!(output.contains("row locked"));
        assert!(output.contains("elapsed_ms"));
    }
}
