/*!
   Bounded polling of test conditions.
*/

use core::time::Duration;
use std::thread::sleep;
use std::time::Instant;

use crate::error::Error;

/**
   Outcome of [`poll_until`].
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The probe reported success.
    Satisfied,

    /// The deadline elapsed without success.
    TimedOut,

    /// The probe reported that success can no longer happen.
    Exhausted,
}

/**
   Outcome of one probe of [`poll_until`].
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Ready,
    Pending,
    /// Stop polling; waiting longer cannot change the result.
    GiveUp,
}

/**
   Bounded retry with an explicit interval and deadline.

   `probe` runs at least once, even with a zero timeout. Sleeps never
   overshoot the deadline. Errors from `probe` abort the wait and are
   propagated unchanged.
*/
pub fn poll_until(
    timeout: Duration,
    interval: Duration,
    mut probe: impl FnMut() -> Result<Probe, Error>,
) -> Result<PollOutcome, Error> {
    let deadline = Instant::now() + timeout;

    loop {
        match probe()? {
            Probe::Ready => return Ok(PollOutcome::Satisfied),
            Probe::GiveUp => return Ok(PollOutcome::Exhausted),
            Probe::Pending => {}
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(PollOutcome::TimedOut);
        }

        sleep(interval.min(deadline - now));
    }
}
