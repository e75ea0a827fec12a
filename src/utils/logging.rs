use log::{log_enabled, Level};
use std::time::Instant;

/// Scoped timer emitting trace spans around step phases.
pub(crate) struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            let elapsed = self.start.elapsed();
            log::trace!("{} took {} µs", self.label, elapsed.as_micros());
        }
    }
}
