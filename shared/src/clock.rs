//! Client-side server clock estimation
//!
//! Display clients send `ping`, the server answers `pong { serverNowMs }`.
//! Each round trip yields one offset sample, assuming the reply spent half
//! the round trip in flight:
//!
//! ```text
//! offset = (server_now + rtt / 2) - client_receive
//! ```
//!
//! The last [`WINDOW`] samples are averaged, and the published offset is
//! smoothed as `0.7 * previous + 0.3 * window_average` (the first estimate is
//! taken as-is).

use std::collections::VecDeque;

/// Number of samples kept for the rolling average
pub const WINDOW: usize = 5;

const PREVIOUS_WEIGHT: f64 = 0.7;
const SAMPLE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Default)]
pub struct ClockOffsetEstimator {
    samples: VecDeque<f64>,
    offset_ms: Option<f64>,
}

impl ClockOffsetEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one ping/pong exchange, returns the updated offset.
    pub fn record(&mut self, client_sent_ms: i64, server_now_ms: i64, client_received_ms: i64) -> f64 {
        let rtt = (client_received_ms - client_sent_ms).max(0) as f64;
        let sample = server_now_ms as f64 + rtt / 2.0 - client_received_ms as f64;

        self.samples.push_back(sample);
        if self.samples.len() > WINDOW {
            self.samples.pop_front();
        }
        let average = self.samples.iter().sum::<f64>() / self.samples.len() as f64;

        let next = match self.offset_ms {
            None => average,
            Some(previous) => PREVIOUS_WEIGHT * previous + SAMPLE_WEIGHT * average,
        };
        self.offset_ms = Some(next);
        next
    }

    /// Current estimate of `server_clock - client_clock` in milliseconds.
    pub fn offset_ms(&self) -> f64 {
        self.offset_ms.unwrap_or(0.0)
    }

    /// Translate a local timestamp into estimated server time.
    pub fn server_now_ms(&self, client_now_ms: i64) -> i64 {
        client_now_ms + self.offset_ms().round() as i64
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}
