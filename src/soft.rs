//! Deferred-failure assertions.
//!
//! [`SoftAssertions`] records every check instead of panicking on the first
//! violation. Failures only surface when the collector is flushed at the end of
//! a run, so one report lists all of them.

use std::fmt::Debug;

use tracing::warn;

/// One recorded check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub description: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

#[derive(Debug, Default)]
pub struct SoftAssertions {
    recorded: Vec<Assertion>,
}

impl SoftAssertions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records whether `actual == expected`. Returns the outcome so callers can
    /// branch on it without re-comparing.
    pub fn assert_eq<T>(&mut self, description: impl Into<String>, expected: T, actual: T) -> bool
    where
        T: PartialEq + Debug,
    {
        let passed = expected == actual;
        self.record(Assertion {
            description: description.into(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
            passed,
        })
    }

    pub fn assert_that(
        &mut self,
        description: impl Into<String>,
        condition: bool,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> bool {
        self.record(Assertion {
            description: description.into(),
            expected: expected.into(),
            actual: actual.into(),
            passed: condition,
        })
    }

    /// Records that an operation expected to succeed did not throw.
    pub fn assert_ok<T, E: std::fmt::Display>(
        &mut self,
        description: impl Into<String>,
        result: &Result<T, E>,
    ) -> bool {
        let actual = match result {
            Ok(_) => "no error".to_string(),
            Err(err) => err.to_string(),
        };
        self.assert_that(description, result.is_ok(), "no error", actual)
    }

    fn record(&mut self, assertion: Assertion) -> bool {
        let passed = assertion.passed;
        if !passed {
            warn!(
                description = %assertion.description,
                expected = %assertion.expected,
                actual = %assertion.actual,
                "soft assertion failed"
            );
        }
        self.recorded.push(assertion);
        passed
    }

    pub fn recorded(&self) -> &[Assertion] {
        &self.recorded
    }

    pub fn failures(&self) -> impl Iterator<Item = &Assertion> {
        self.recorded.iter().filter(|a| !a.passed)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Drains the collector. `Err` carries every failed assertion in recording
    /// order.
    pub fn flush(&mut self) -> Result<Vec<Assertion>, Vec<Assertion>> {
        let recorded = std::mem::take(&mut self.recorded);
        let failed: Vec<Assertion> = recorded.iter().filter(|a| !a.passed).cloned().collect();
        if failed.is_empty() {
            Ok(recorded)
        } else {
            Err(failed)
        }
    }
}
