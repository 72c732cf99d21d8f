/*!
   Configuration and lifecycle of the node-under-test.
*/

pub mod config;
pub mod runner;
