//! Batch acceptance tests: a list of inputs, each with the verdict of its last run.

use crate::{
    evaluator::evaluate_with_limit,
    table::TransitionTable,
    types::{Verdict, MAX_BATCH_STEPS},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Display status of a test case.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    /// Not run since it was added or edited.
    #[default]
    Idle,
    Accepted,
    Rejected,
}

impl From<Verdict> for TestStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted => TestStatus::Accepted,
            Verdict::Rejected => TestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: u64,
    pub input: String,
    pub status: TestStatus,
}

/// An ordered list of test cases with stable ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    cases: Vec<TestCase>,
    next_id: u64,
    max_steps: usize,
}

impl Default for TestSuite {
    fn default() -> Self {
        Self {
            cases: Vec::new(),
            next_id: 1,
            max_steps: MAX_BATCH_STEPS,
        }
    }
}

impl TestSuite {
    pub fn new() -> Self {
        Self::default()
    }

    /// A suite whose runs use `max_steps` as the step budget per case.
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            max_steps,
            ..Self::default()
        }
    }

    /// Appends a case and returns its id.
    pub fn add(&mut self, input: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.cases.push(TestCase {
            id,
            input: input.into(),
            status: TestStatus::Idle,
        });
        id
    }

    /// Removes the case with `id`. Returns whether it existed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.cases.len();
        self.cases.retain(|case| case.id != id);
        self.cases.len() != before
    }

    /// Replaces the input of case `id` and resets its status.
    pub fn update_input(&mut self, id: u64, input: impl Into<String>) -> bool {
        match self.cases.iter_mut().find(|case| case.id == id) {
            Some(case) => {
                case.input = input.into();
                case.status = TestStatus::Idle;
                true
            }
            None => false,
        }
    }

    /// Evaluates every case against `table` and records the verdicts.
    ///
    /// Cases are independent, so the order they run in does not matter.
    pub fn run_all(&mut self, table: &TransitionTable) {
        for case in &mut self.cases {
            case.status = evaluate_with_limit(table, &case.input, self.max_steps).into();
        }

        debug!(
            cases = self.cases.len(),
            accepted = self.count(TestStatus::Accepted),
            "test suite finished"
        );
    }

    /// Marks every case as not run.
    pub fn reset(&mut self) {
        for case in &mut self.cases {
            case.status = TestStatus::Idle;
        }
    }

    pub fn get(&self, id: u64) -> Option<&TestCase> {
        self.cases.iter().find(|case| case.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter()
    }

    /// Number of cases with `status`.
    pub fn count(&self, status: TestStatus) -> usize {
        self.cases.iter().filter(|case| case.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::compile;

    fn even_as() -> TransitionTable {
        compile(include_str!("../programs/even-as.tm")).unwrap().table
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut suite = TestSuite::new();

        assert_eq!(suite.add("a"), 1);
        assert_eq!(suite.add("b"), 2);
        assert!(suite.remove(1));
        assert_eq!(suite.add("c"), 3);
        assert_eq!(suite.len(), 2);
    }

    #[test]
    fn test_run_all_records_verdicts() {
        let mut suite = TestSuite::new();
        let even = suite.add("abab");
        let odd = suite.add("bab");
        let empty = suite.add("");

        suite.run_all(&even_as());

        assert_eq!(suite.get(even).unwrap().status, TestStatus::Accepted);
        assert_eq!(suite.get(odd).unwrap().status, TestStatus::Rejected);
        assert_eq!(suite.get(empty).unwrap().status, TestStatus::Accepted);
        assert_eq!(suite.count(TestStatus::Accepted), 2);
    }

    #[test]
    fn test_update_input_resets_status() {
        let mut suite = TestSuite::new();
        let id = suite.add("aa");
        suite.run_all(&even_as());

        assert!(suite.update_input(id, "a"));
        assert_eq!(suite.get(id).unwrap().status, TestStatus::Idle);
        assert_eq!(suite.get(id).unwrap().input, "a");
        assert!(!suite.update_input(99, "x"));
    }

    #[test]
    fn test_remove_missing_case() {
        let mut suite = TestSuite::new();
        assert!(!suite.remove(7));
    }

    #[test]
    fn test_reset() {
        let mut suite = TestSuite::new();
        suite.add("aa");
        suite.run_all(&even_as());
        suite.reset();

        assert_eq!(suite.count(TestStatus::Idle), 1);
    }

    #[test]
    fn test_step_budget_applies() {
        let table = compile("q0 a/a,R q0\nq0 _/_,S ha").unwrap().table;
        let mut suite = TestSuite::with_max_steps(2);
        let id = suite.add("aaaa");

        suite.run_all(&table);

        assert_eq!(suite.get(id).unwrap().status, TestStatus::Rejected);
    }
}
