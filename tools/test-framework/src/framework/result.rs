/*!
   Outcome of a single test case.
*/

use core::fmt::{self, Display};
use std::any::Any;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed,

    /// The case returned an error, e.g. from a failed
    /// [`test_check!`](crate::test_check).
    Failed { reason: String },

    /// The case panicked.
    Crashed { reason: String },
}

impl TestResult {
    pub fn from_outcome(outcome: Result<(), Error>) -> Self {
        match outcome {
            Ok(()) => TestResult::Passed,
            Err(e) => TestResult::Failed {
                reason: e.to_string(),
            },
        }
    }

    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let reason = if let Some(message) = payload.downcast_ref::<&str>() {
            message.to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "panic with a non-string payload".to_string()
        };

        TestResult::Crashed { reason }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, TestResult::Passed)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            TestResult::Passed => None,
            TestResult::Failed { reason } | TestResult::Crashed { reason } => Some(reason),
        }
    }
}

impl Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Passed => write!(f, "PASSED"),
            TestResult::Failed { .. } => write!(f, "FAILED"),
            TestResult::Crashed { .. } => write!(f, "CRASHED"),
        }
    }
}
