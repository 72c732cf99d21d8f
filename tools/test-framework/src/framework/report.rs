/*!
   Aggregated results of a registry run.
*/

use core::fmt::Write;
use core::time::Duration;

use crate::framework::result::TestResult;

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub result: TestResult,
    pub duration: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    pub fn push(&mut self, case: CaseReport) {
        self.cases.push(case);
    }

    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.result.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    /**
       True if every case that ran passed. An empty run counts as passed.
    */
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /**
       Process exit code for the run: 0 if every case passed, 1 otherwise.
    */
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /**
       One line per case followed by the totals, e.g.

       ```text
       test_transfer ........ PASSED (4.21s)
       test_transfer_failed . FAILED (3.02s): check failed at ...
       2 cases: 1 passed, 1 failed
       ```
    */
    pub fn summary(&self) -> String {
        let width = self.cases.iter().map(|c| c.name.len()).max().unwrap_or(0) + 1;

        let mut summary = String::new();

        for case in &self.cases {
            let _ = write!(
                summary,
                "{} {} {} ({:.2}s)",
                case.name,
                ".".repeat(width - case.name.len()),
                case.result,
                case.duration.as_secs_f64()
            );

            if let Some(reason) = case.result.reason() {
                let _ = write!(summary, ": {reason}");
            }

            summary.push('\n');
        }

        let _ = write!(
            summary,
            "{} cases: {} passed, {} failed",
            self.cases.len(),
            self.passed(),
            self.failed()
        );

        summary
    }
}
