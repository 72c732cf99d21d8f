/*!
   Definitions of the data types used by the test framework.
*/

pub mod address;
pub mod config;
pub mod env;
pub mod log;
pub mod log_sink;
pub mod node_id;
pub mod process;
