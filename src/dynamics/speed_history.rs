use std::collections::VecDeque;

use crate::config::{MIN_SPEED_SAMPLES, RECENT_SPEEDS_AMOUNT};

/// Bounded FIFO of recent speeds used to judge whether motion has settled.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedHistory {
    speeds: VecDeque<f64>,
}

impl Default for SpeedHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedHistory {
    pub fn new() -> Self {
        Self {
            speeds: VecDeque::with_capacity(RECENT_SPEEDS_AMOUNT),
        }
    }

    /// Records a speed, evicting the oldest sample once full.
    pub fn push(&mut self, speed: f64) {
        if self.speeds.len() == RECENT_SPEEDS_AMOUNT {
            self.speeds.pop_front();
        }
        self.speeds.push_back(speed);
    }

    /// Mean of the recorded speeds, or infinity while warming up.
    pub fn average(&self) -> f64 {
        if self.speeds.len() < MIN_SPEED_SAMPLES {
            return f64::INFINITY;
        }
        self.speeds.iter().sum::<f64>() / self.speeds.len() as f64
    }

    pub fn clear(&mut self) {
        self.speeds.clear();
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.speeds.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_capacity() {
        let mut history = SpeedHistory::new();
        for i in 0..25 {
            history.push(i as f64);
            assert!(history.len() <= RECENT_SPEEDS_AMOUNT);
        }
        assert_eq!(history.iter().next(), Some(15.0));
    }

    #[test]
    fn average_is_unbounded_until_nine_samples() {
        let mut history = SpeedHistory::new();
        for _ in 0..8 {
            history.push(0.0);
            assert!(history.average().is_infinite());
        }
        history.push(0.0);
        assert_eq!(history.average(), 0.0);
    }

    #[test]
    fn average_is_mean_of_window() {
        let mut history = SpeedHistory::new();
        for speed in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0] {
            history.push(speed);
        }
        assert!((history.average() - 6.5).abs() < 1e-12);

        history.clear();
        assert!(history.is_empty());
        assert!(history.average().is_infinite());
    }
}
