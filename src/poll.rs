// src/poll.rs

// Bounded busy-wait used by every RX/TX wait.
// Elapsed time is the sum of the delays issued between checks, the same
// accounting a bare-metal target without a clock source can do. Time spent
// inside the check itself is not counted.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Give up once this much delay has accumulated.
    pub timeout_us: u32,
    /// Delay between two checks.
    pub interval_us: u32,
}

impl PollPolicy {
    pub const fn new(timeout_us: u32, interval_us: u32) -> Self {
        PollPolicy {
            timeout_us,
            interval_us,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wait {
    Ready,
    TimedOut,
    Cancelled,
}

/// Consulted before every check.
pub trait Cancel {
    fn is_cancelled(&self) -> bool;
}

/// Token that never fires.
pub struct NeverCancel;

impl Cancel for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancel for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<C: Cancel + ?Sized> Cancel for &C {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Probes until `ready` returns `true`, the policy runs out, or `cancel` fires.
/// The first check happens before any delay.
pub fn poll_until<D, C, E>(
    delay: &mut D,
    policy: PollPolicy,
    cancel: &C,
    mut ready: impl FnMut() -> Result<bool, E>,
) -> Result<Wait, E>
where
    D: DelayNs,
    C: Cancel + ?Sized,
{
    let step = policy.interval_us.max(1);
    let mut elapsed: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return Ok(Wait::Cancelled);
        }
        if ready()? {
            return Ok(Wait::Ready);
        }
        if elapsed >= policy.timeout_us {
            return Ok(Wait::TimedOut);
        }
        delay.delay_us(step);
        elapsed = elapsed.saturating_add(step);
    }
}
