//! The economy clock.
//!
//! Counts game days down from the configured start to zero, one day per
//! tick. The clock itself never runs on its own: the session calls
//! [`EconomyClock::tick`] when the scheduler's day timer fires, and skips
//! the call while the clock is suspended.
//!
//! # Design Principles
//!
//! - Days are floored at zero; ticking an exhausted clock is a no-op.
//! - Offer refreshes are derived from the day count, never stored.

/// Result of one day tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTick {
    /// Days left after the tick.
    pub days_left: u32,
    /// Whether this tick landed on an offer refresh day.
    pub refresh_due: bool,
}

/// Countdown of game days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EconomyClock {
    days_left: u32,
    refresh_every: u32,
}

impl EconomyClock {
    /// Create a clock with `days` left that refreshes offers every
    /// `refresh_every` days. A zero refresh interval is treated as 1.
    pub const fn new(days: u32, refresh_every: u32) -> Self {
        Self {
            days_left: days,
            refresh_every: if refresh_every == 0 { 1 } else { refresh_every },
        }
    }

    /// Days remaining.
    pub const fn days_left(&self) -> u32 {
        self.days_left
    }

    /// Whether the clock has run out.
    pub const fn is_exhausted(&self) -> bool {
        self.days_left == 0
    }

    /// Advance one day.
    ///
    /// A refresh is due when the new day count is a positive multiple of
    /// the refresh interval.
    pub const fn tick(&mut self) -> DayTick {
        self.days_left = self.days_left.saturating_sub(1);
        let refresh_due =
            self.days_left > 0 && matches!(self.days_left.checked_rem(self.refresh_every), Some(0));
        DayTick {
            days_left: self.days_left,
            refresh_due,
        }
    }
}
