//! Countdown and quality-hold math
//!
//! The authoritative "is it done" answer is always a pure function of
//! `(now, started_at, duration)`. Server timer events only tell connected
//! displays to re-render early; every client recomputes from these values.

use serde::{Deserialize, Serialize};

/// `started_at + duration - now`, in milliseconds.
pub fn remaining_ms(started_at_ms: i64, duration_seconds: i64, now_ms: i64) -> i64 {
    started_at_ms + duration_seconds * 1000 - now_ms
}

/// Still cooking iff strictly positive time remains; zero means the
/// quality hold has begun.
pub fn is_cooking(started_at_ms: i64, duration_seconds: i64, now_ms: i64) -> bool {
    remaining_ms(started_at_ms, duration_seconds, now_ms) > 0
}

/// Whole seconds left on the countdown for display, never negative.
pub fn remaining_display_secs(started_at_ms: i64, duration_seconds: i64, now_ms: i64) -> i64 {
    let remaining = remaining_ms(started_at_ms, duration_seconds, now_ms);
    if remaining <= 0 {
        0
    } else {
        (remaining + 500) / 1000
    }
}

/// Seconds of hold time left once cooking is done (negative when expired).
pub fn hold_remaining_secs(
    started_at_ms: i64,
    duration_seconds: i64,
    hold_time_seconds: i64,
    now_ms: i64,
) -> i64 {
    let overdue_ms = -remaining_ms(started_at_ms, duration_seconds, now_ms);
    hold_time_seconds - overdue_ms.max(0) / 1000
}

/// Where a started ticket sits on the cook → hold → discard timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldStatus {
    Cooking,
    /// Done, within the first half of the hold window
    Holding,
    /// Done, past half of the hold window
    Expiring,
    /// Hold window exhausted
    Expired,
}

pub fn hold_status(
    started_at_ms: i64,
    duration_seconds: i64,
    hold_time_seconds: i64,
    now_ms: i64,
) -> HoldStatus {
    if is_cooking(started_at_ms, duration_seconds, now_ms) {
        return HoldStatus::Cooking;
    }
    let left = hold_remaining_secs(started_at_ms, duration_seconds, hold_time_seconds, now_ms);
    if left <= 0 {
        HoldStatus::Expired
    } else if left <= hold_time_seconds / 2 {
        HoldStatus::Expiring
    } else {
        HoldStatus::Holding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: i64 = 1000;
    const COOK: i64 = 480;

    #[test]
    fn zero_remaining_is_not_cooking() {
        let deadline = START + COOK * 1000;
        assert_eq!(remaining_ms(START, COOK, deadline - 1), 1);
        assert!(is_cooking(START, COOK, deadline - 1));
        assert_eq!(remaining_ms(START, COOK, deadline), 0);
        assert!(!is_cooking(START, COOK, deadline));
    }

    #[test]
    fn display_seconds_round_and_clamp() {
        assert_eq!(remaining_display_secs(START, COOK, START), 480);
        assert_eq!(remaining_display_secs(START, COOK, START + 1_400), 479);
        assert_eq!(remaining_display_secs(START, COOK, START + 500_000), 0);
    }

    #[test]
    fn hold_progression() {
        let deadline = START + COOK * 1000;
        assert_eq!(hold_status(START, COOK, 600, deadline - 1), HoldStatus::Cooking);
        assert_eq!(hold_status(START, COOK, 600, deadline), HoldStatus::Holding);
        assert_eq!(hold_status(START, COOK, 600, deadline + 299_000), HoldStatus::Holding);
        assert_eq!(hold_status(START, COOK, 600, deadline + 300_000), HoldStatus::Expiring);
        assert_eq!(hold_status(START, COOK, 600, deadline + 600_000), HoldStatus::Expired);
    }

    #[test]
    fn hold_remaining_counts_down_after_deadline() {
        let deadline = START + COOK * 1000;
        assert_eq!(hold_remaining_secs(START, COOK, 600, START), 600);
        assert_eq!(hold_remaining_secs(START, COOK, 600, deadline + 61_000), 539);
        assert_eq!(hold_remaining_secs(START, COOK, 600, deadline + 700_000), -100);
    }
}
