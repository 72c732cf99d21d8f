/*!
   All test cases are placed within this module.

   We expose the modules as public so that cargo doc
   will pick up the definition by default.
*/


use ledger_test_framework::prelude::*;

/**
   Register every test case of this crate, in the order they run.
*/
pub fn register_all(registry: &mut TestRegistry) -> Result<(), Error> {
    transfer::register(registry)?;

    Ok(())
}
