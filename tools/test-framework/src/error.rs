/*!
   Error type used by the test framework.

   Errors returned from a test case are caught by the
   [`TestRegistry`](crate::framework::registry::TestRegistry) driver and
   turned into a failed [`TestResult`](crate::framework::result::TestResult).
*/

use core::time::Duration;
use eyre::Report;
use flex_error::{define_error, TraceError};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};

define_error! {
    Error {
        Generic
            [ TraceError<Report> ]
            | _ | { "generic error" },

        Io
            [ TraceError<IoError> ]
            | _ | { "io error" },

        Config
            { message: String }
            | e | { format_args!("invalid test configuration: {}", e.message) },

        CommandNotFound
            { command: String }
            [ TraceError<IoError> ]
            | e | {
                format_args!("failed to execute command: {}. make sure it exists and is executable",
                    e.command)
            },

        Launch
            { command: String }
            [ TraceError<IoError> ]
            | e | { format_args!("failed to spawn process for command: {}", e.command) },

        UnexpectedExit
            {
                role: String,
                code: Option<i32>,
            }
            | e | {
                format_args!("process {} exited unexpectedly with status code {:?}",
                    e.role, e.code)
            },

        ProcessTimeout
            {
                command: String,
                timeout: Duration,
            }
            | e | {
                format_args!("process {} did not exit within {:?}",
                    e.command, e.timeout)
            },

        Assertion
            { message: String }
            | e | { format_args!("assertion failure: {}", e.message) },

        AssertionFailed
            {
                expression: String,
                location: String,
            }
            | e | {
                format_args!("check failed at {}: {}",
                    e.location, e.expression)
            },

        DuplicateTestCase
            { name: String }
            | e | { format_args!("test case {} is already registered", e.name) },

        InvalidAddress
            {
                address: String,
                length: usize,
            }
            | e | {
                format_args!("address {:?} must be exactly {} characters long",
                    e.address, e.length)
            },
    }
}

pub fn handle_generic_error(e: impl Into<Report>) -> Error {
    Error::generic(e.into())
}

/**
   Map a spawn failure of `command` into [`Error`], singling out the case
   where the executable could not be found.
*/
pub fn handle_exec_error(command: &str) -> impl FnOnce(IoError) -> Error + '_ {
    move |e| match e.kind() {
        IoErrorKind::NotFound | IoErrorKind::PermissionDenied => {
            Error::command_not_found(command.to_string(), e)
        }
        _ => Error::launch(command.to_string(), e),
    }
}

impl From<Report> for Error {
    fn from(e: Report) -> Self {
        Error::generic(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::io(e)
    }
}

impl Error {
    /**
       Returns `true` if the error was produced by a failed check or by a
       predicate reporting an assertion, as opposed to a fault in the
       harness itself.
    */
    pub fn is_assertion(&self) -> bool {
        matches!(
            self.detail(),
            ErrorDetail::Assertion(_) | ErrorDetail::AssertionFailed(_)
        )
    }

    /**
       Returns `true` if the error means an executable could not be started.
    */
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self.detail(),
            ErrorDetail::Launch(_) | ErrorDetail::CommandNotFound(_)
        )
    }
}
