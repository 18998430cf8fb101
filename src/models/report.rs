//! Cumulative report folded from finished scopes

use serde::Serialize;
use std::fmt;

use super::scope::ScopeAggregate;

/// Every suite folded so far, plus running totals
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CumulativeReport {
    tests: usize,
    failures: usize,
    errors: usize,
    skipped: usize,
    suites: Vec<ScopeAggregate>,
}

impl CumulativeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, suite: ScopeAggregate) {
        self.tests += suite.tests();
        self.failures += suite.failures();
        self.errors += suite.errors();
        self.skipped += suite.skipped();
        self.suites.push(suite);
    }

    /// Drop all folded suites and zero the totals
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn tests(&self) -> usize {
        self.tests
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn suites(&self) -> &[ScopeAggregate] {
        &self.suites
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    pub fn passed(&self) -> usize {
        self.tests - self.failures - self.errors - self.skipped
    }

    pub fn pass_rate(&self) -> f64 {
        if self.tests == 0 {
            0.0
        } else {
            (self.passed() as f64 / self.tests as f64) * 100.0
        }
    }
}

impl fmt::Display for CumulativeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Suites: {} | Total: {} | Pass: {} | Fail: {} | Error: {} | Skip: {} | Pass Rate: {:.1}%",
            self.suites.len(),
            self.tests,
            self.passed(),
            self.failures,
            self.errors,
            self.skipped,
            self.pass_rate()
        )
    }
}
