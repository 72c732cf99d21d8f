/*!
   Helper functions for setting up test cases in an imperative way.

   [`init`] prepares the whole run, [`single`] starts one node inside a
   test case.
*/

pub mod init;
pub mod single;
