//! Diagnostics side channel.
//!
//! Warnings produced during inference and generation go through this trait
//! instead of a return value: they never affect correctness and never halt a
//! run. Callers inject their own sink (the CLI renders them colored, tests
//! collect them); the default writes to stderr.

use std::sync::Mutex;

pub trait Diagnostics: Sync {
    fn log(&self, category: &str, message: &str);
}

/// Default sink: one stderr line per diagnostic.
pub struct StderrDiagnostics;

impl Diagnostics for StderrDiagnostics {
    fn log(&self, category: &str, message: &str) {
        eprintln!("[{category}] {message}");
    }
}

/// Discards everything. Handy in tests that don't assert on warnings.
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn log(&self, _category: &str, _message: &str) {}
}

/// Collects diagnostics for inspection in tests.
#[derive(Default)]
pub struct CollectingDiagnostics {
    entries: Mutex<Vec<(String, String)>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().expect("diagnostics lock").clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn log(&self, category: &str, message: &str) {
        self.entries
            .lock()
            .expect("diagnostics lock")
            .push((category.to_string(), message.to_string()));
    }
}
