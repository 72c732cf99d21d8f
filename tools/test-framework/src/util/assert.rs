/*!
   Assertion primitive that fails the current test case by returning an
   [`Error`](crate::error::Error) instead of panicking, so that scoped
   resources such as a running node are released by the normal `Drop` path.
*/

/**
   Evaluate a boolean condition and, when it is false, return from the
   enclosing function with
   [`Error::assertion_failed`](crate::error::Error::assertion_failed)
   recording the source expression and its location.

   The enclosing function must return `Result<_, E>` where `E: From<Error>`.

   ```rust
   use ledger_test_framework::prelude::*;

   fn scenario(balance: u64) -> Result<(), Error> {
       test_check!(balance == 333);
       Ok(())
   }

   assert!(scenario(333).is_ok());
   assert!(scenario(0).unwrap_err().is_assertion());
   ```
*/
#[macro_export]
macro_rules! test_check {
    ($cond:expr $(,)?) => {
        if !($cond) {
            return ::core::result::Result::Err(
                $crate::error::Error::assertion_failed(
                    ::std::string::String::from(::core::stringify!($cond)),
                    ::std::format!("{}:{}", ::core::file!(), ::core::line!()),
                )
                .into(),
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::error::{Error, ErrorDetail};

    fn check_positive(value: i64) -> Result<(), Error> {
        test_check!(value > 0);
        Ok(())
    }

    #[test]
    fn test_check_records_expression_and_location() {
        assert!(check_positive(1).is_ok());

        let err = check_positive(-1).unwrap_err();
        match err.detail() {
            ErrorDetail::AssertionFailed(e) => {
                assert_eq!(e.expression, "value > 0");
                assert!(e.location.contains("assert.rs:"));
            }
            _ => panic!("expected failed check, got {err}"),
        }
    }
}
