/*!
   Framework for registering test cases and running them in isolation.

   A scenario crate registers its cases into a [`TestRegistry`] and hands
   the registry to a driver, typically the `ledger-integration-test`
   binary, which runs them and turns the [`RunReport`] into an exit code.
*/

pub mod registry;
pub mod report;
pub mod result;

pub use registry::{TestCase, TestRegistry};
pub use report::{CaseReport, RunReport};
pub use result::TestResult;
