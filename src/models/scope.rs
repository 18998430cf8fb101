//! Per-story scope accumulation
//!
//! A `ScopeAggregator` is owned by exactly one story and is never shared,
//! so it carries no locking.

use serde::Serialize;
use std::fmt;

use super::record::{ResultRecord, ResultStatus};

/// Results recorded under one named scope; becomes one suite in the report
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScopeAggregate {
    name: String,
    tests: usize,
    failures: usize,
    errors: usize,
    skipped: usize,
    records: Vec<ResultRecord>,
}

impl ScopeAggregate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a finished aggregate from a list of records
    pub fn from_records(name: impl Into<String>, records: Vec<ResultRecord>) -> Self {
        let mut aggregate = Self::new(name);
        for record in records {
            aggregate.push(record);
        }
        aggregate
    }

    fn push(&mut self, record: ResultRecord) {
        match record.status() {
            ResultStatus::Error => self.errors += 1,
            ResultStatus::Failure => self.failures += 1,
            ResultStatus::Skip => self.skipped += 1,
            ResultStatus::Pass => {}
        }
        self.tests += 1;
        self.records.push(record);
    }

    pub fn name(&self) -> &str {
        &self.name
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

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn passed(&self) -> usize {
        self.tests - self.failures - self.errors - self.skipped
    }
}

impl fmt::Display for ScopeAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Total: {} | Pass: {} | Fail: {} | Error: {} | Skip: {}",
            self.name,
            self.tests,
            self.passed(),
            self.failures,
            self.errors,
            self.skipped
        )
    }
}

/// Story-local accumulator of scopes
#[derive(Debug, Default)]
pub struct ScopeAggregator {
    current: Option<ScopeAggregate>,
    closed: Vec<ScopeAggregate>,
}

impl ScopeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new scope; the current one is closed and kept, empty or not
    pub fn begin_scope(&mut self, name: impl Into<String>) {
        if let Some(previous) = self.current.take() {
            self.closed.push(previous);
        }
        self.current = Some(ScopeAggregate::new(name));
    }

    /// Record one result in the current scope (an unnamed scope if none began)
    pub fn record_result(&mut self, record: ResultRecord) {
        self.current
            .get_or_insert_with(ScopeAggregate::default)
            .push(record);
    }

    /// Close the current scope and hand it back
    pub fn end_scope(&mut self) -> Option<ScopeAggregate> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&ScopeAggregate> {
        self.current.as_ref()
    }

    /// Every scope of the story in the order it was begun; leaves the
    /// aggregator empty for the next story
    pub fn finish(&mut self) -> Vec<ScopeAggregate> {
        let mut scopes = std::mem::take(&mut self.closed);
        if let Some(current) = self.current.take() {
            scopes.push(current);
        }
        scopes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(aggregate: &ScopeAggregate) {
        assert_eq!(aggregate.tests(), aggregate.records().len());
        let classified = aggregate.failures() + aggregate.errors() + aggregate.skipped();
        assert!(classified <= aggregate.tests());
    }

    #[test]
    fn test_each_record_bumps_one_counter() {
        let mut aggregator = ScopeAggregator::new();
        aggregator.begin_scope("Adding negative");

        let records = vec![
            ResultRecord::pass(),
            ResultRecord::failure("Expected: -5 Actual: -2"),
            ResultRecord::error("panic"),
            ResultRecord::skip(),
            ResultRecord::skip().with_failure("both").with_error("all three"),
        ];

        let mut expected = (0, 0, 0);
        for record in records {
            match record.status() {
                ResultStatus::Failure => expected.0 += 1,
                ResultStatus::Error => expected.1 += 1,
                ResultStatus::Skip => expected.2 += 1,
                ResultStatus::Pass => {}
            }
            aggregator.record_result(record);
            let current = aggregator.current().unwrap();
            assert_consistent(current);
            assert_eq!(
                (current.failures(), current.errors(), current.skipped()),
                expected
            );
        }

        let scope = aggregator.end_scope().unwrap();
        assert_eq!(scope.name(), "Adding negative");
        assert_eq!(scope.tests(), 5);
        assert_eq!(scope.failures(), 1);
        assert_eq!(scope.errors(), 2);
        assert_eq!(scope.skipped(), 1);
        assert_eq!(scope.passed(), 1);
        assert!(aggregator.current().is_none());
    }

    #[test]
    fn test_record_without_scope_opens_unnamed_scope() {
        let mut aggregator = ScopeAggregator::new();
        aggregator.record_result(ResultRecord::pass());

        let scopes = aggregator.finish();
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].name(), "");
        assert_eq!(scopes[0].tests(), 1);
    }

    #[test]
    fn test_reentering_keeps_earlier_results() {
        let mut aggregator = ScopeAggregator::new();
        aggregator.begin_scope("outer");
        aggregator.record_result(ResultRecord::pass());
        aggregator.begin_scope("inner");
        aggregator.record_result(ResultRecord::skip());

        let scopes = aggregator.finish();
        let names: Vec<_> = scopes.iter().map(ScopeAggregate::name).collect();
        assert_eq!(names, vec!["outer", "inner"]);
        assert!(aggregator.finish().is_empty());
    }

    #[test]
    fn test_empty_scopes_kept_wherever_they_appear() {
        let mut aggregator = ScopeAggregator::new();
        aggregator.begin_scope("A");
        aggregator.begin_scope("B");
        let scopes = aggregator.finish();
        assert!(scopes.iter().all(ScopeAggregate::is_empty));
        let counts: Vec<_> = scopes
            .iter()
            .map(|s| (s.name().to_string(), s.tests()))
            .collect();
        assert_eq!(counts, vec![("A".to_string(), 0), ("B".to_string(), 0)]);

        aggregator.begin_scope("A");
        aggregator.record_result(ResultRecord::pass());
        aggregator.begin_scope("B");
        let counts: Vec<_> = aggregator
            .finish()
            .iter()
            .map(|s| (s.name().to_string(), s.tests()))
            .collect();
        assert_eq!(counts, vec![("A".to_string(), 1), ("B".to_string(), 0)]);
    }

    #[test]
    fn test_from_records() {
        let scope = ScopeAggregate::from_records(
            "Inserting edges",
            vec![ResultRecord::skip(), ResultRecord::pass()],
        );
        assert_consistent(&scope);
        assert_eq!(scope.skipped(), 1);
        assert_eq!(
            scope.to_string(),
            "Inserting edges: Total: 2 | Pass: 1 | Fail: 0 | Error: 0 | Skip: 1"
        );
    }
}
