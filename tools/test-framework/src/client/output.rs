/*!
   Captured result of one client invocation.
*/

use serde_json as json;
use std::sync::Arc;

use crate::types::process::ProcessExit;

#[derive(Debug, Clone)]
pub struct ClientOutput {
    pub exit: ProcessExit,

    /// Lines printed on standard output.
    pub lines: Vec<Arc<str>>,

    /// Lines printed on standard error.
    pub stderr: Vec<Arc<str>>,
}

impl ClientOutput {
    pub fn success(&self) -> bool {
        self.exit.success()
    }

    /**
       The balance reported by a `get_balance` invocation, if any.
    */
    pub fn balance(&self) -> Option<u64> {
        parse_balance(&self.lines)
    }
}

/**
   Extract a balance from the standard output of the client.

   Two shapes are understood. A JSON document with a `balance` field,
   holding either a number or a decimal string:

   ```text
   {"balance": 333}
   ```

   Otherwise the last line mentioning `balance` is used. The balance is
   the integer directly after the first `:`, `=` or ` is ` following the
   word, as in `Balance of 1111...: 333` or `balance is 7.` A line where
   that token is missing or not an integer yields `None`, so digits in an
   address or in trailing text are never taken for a balance.
*/
pub fn parse_balance<S: AsRef<str>>(lines: &[S]) -> Option<u64> {
    let joined = itertools::join(lines.iter().map(AsRef::as_ref), "\n");

    if let Ok(value) = json::from_str::<json::Value>(joined.trim()) {
        return match value.get("balance")? {
            json::Value::Number(n) => n.as_u64(),
            json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
    }

    lines
        .iter()
        .map(AsRef::as_ref)
        .rev()
        .find(|line| line.to_ascii_lowercase().contains(BALANCE_KEYWORD))
        .and_then(balance_after_separator)
}

const BALANCE_KEYWORD: &str = "balance";

fn balance_after_separator(line: &str) -> Option<u64> {
    // ascii lowercasing keeps byte offsets intact
    let keyword_end = line.to_ascii_lowercase().find(BALANCE_KEYWORD)? + BALANCE_KEYWORD.len();
    let rest = &line[keyword_end..];

    let symbol = rest.find(|c: char| c == ':' || c == '=').map(|i| i + 1);
    let word = rest.find(" is ").map(|i| i + " is ".len());

    let value_start = match (symbol, word) {
        (Some(a), Some(b)) => a.min(b),
        (a, b) => a.or(b)?,
    };

    let token = rest[value_start..].split_whitespace().next()?;

    token.trim_end_matches(|c: char| c == '.' || c == ',').parse().ok()
}
