/*!
   Registration and execution of named test cases.
*/

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::framework::report::{CaseReport, RunReport};
use crate::framework::result::TestResult;
use crate::types::config::TestConfig;

/**
   A test case receives the [`TestConfig`] of the run, which carries the
   paths of the node and client executables. Its `store_dir` points to a
   directory reserved for the case.

   Any `Fn(&TestConfig) -> Result<(), Error>` is a test case.
*/
pub trait TestCase {
    fn run(&self, config: &TestConfig) -> Result<(), Error>;
}

impl<F> TestCase for F
where
    F: Fn(&TestConfig) -> Result<(), Error>,
{
    fn run(&self, config: &TestConfig) -> Result<(), Error> {
        self(config)
    }
}

struct RegisteredCase {
    name: String,
    case: Box<dyn TestCase>,
}

/**
   An ordered set of uniquely named test cases.

   Cases run one after another in registration order. Each runs in
   isolation: a case that returns an error or panics is recorded as such
   and the run moves on to the next one. Any node started by a case is
   torn down before its result is recorded, since the runner is dropped
   when the case returns or unwinds.
*/
#[derive(Default)]
pub struct TestRegistry {
    cases: Vec<RegisteredCase>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, case: impl TestCase + 'static) -> Result<(), Error> {
        if self.contains(name) {
            return Err(Error::duplicate_test_case(name.to_string()));
        }

        self.cases.push(RegisteredCase {
            name: name.to_string(),
            case: Box::new(case),
        });

        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cases.iter().any(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /**
       Run every registered case whose name contains `filter`, or all of
       them without a filter, consuming the registry.
    */
    pub fn run(self, config: &TestConfig, filter: Option<&str>) -> RunReport {
        let mut report = RunReport::default();

        for RegisteredCase { name, case } in self.cases {
            if let Some(filter) = filter {
                if !name.contains(filter) {
                    continue;
                }
            }

            info!("running test case {}", name);

            let started = Instant::now();
            let result = run_case(&name, case.as_ref(), config);
            let duration = started.elapsed();

            match &result {
                TestResult::Passed => info!("test case {} passed in {:?}", name, duration),
                TestResult::Failed { reason } => {
                    error!("test case {} failed in {:?}: {}", name, duration, reason)
                }
                TestResult::Crashed { reason } => {
                    error!("test case {} crashed in {:?}: {}", name, duration, reason)
                }
            }

            report.push(CaseReport {
                name,
                result,
                duration,
            });
        }

        if report.cases.is_empty() {
            warn!("no test case matched the filter {:?}", filter);
        }

        report
    }
}

fn run_case(name: &str, case: &dyn TestCase, config: &TestConfig) -> TestResult {
    let case_config = match config.for_case(name) {
        Ok(case_config) => case_config,
        Err(e) => return TestResult::from_outcome(Err(e)),
    };

    match catch_unwind(AssertUnwindSafe(|| case.run(&case_config))) {
        Ok(outcome) => TestResult::from_outcome(outcome),
        Err(payload) => TestResult::from_panic(payload),
    }
}
