/*!
   Ledger account addresses, as passed to the client binary.
*/

use core::fmt::{self, Display};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/**
   Length of an account address token.
*/
pub const ADDRESS_LENGTH: usize = 32;

/**
   A fixed-length account identifier.

   The harness never interprets the content. It is only handed to the
   client binary and searched for in node log lines.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Result<Self, Error> {
        let address = address.into();

        if address.chars().count() != ADDRESS_LENGTH {
            return Err(Error::invalid_address(address, ADDRESS_LENGTH));
        }

        Ok(Self(address))
    }

    /**
       An address made of the same character repeated, e.g. `"0" * 32`.
    */
    pub fn repeated(c: char) -> Self {
        Self(core::iter::repeat(c).take(ADDRESS_LENGTH).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        Self::new(s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> String {
        address.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
