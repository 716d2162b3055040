//! Convergence monitoring for iterative drivers.
use crate::error::{Error, Result};
use crate::Real;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Settings of a [`StopList`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopCriterion {
    /// Maximum distance of the recent values from the oldest value in the window.
    pub tolerance: f64,
    /// Number of recent values that must agree.
    pub window: usize,
}

impl Default for StopCriterion {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            window: 5,
        }
    }
}

/// Sliding-window check whether a monitored scalar has stopped changing.
///
/// ```
/// use femcore::iterate::StopList;
///
/// let mut stop = StopList::new(1e-3, 3);
/// assert!(!stop.stop(1.0));
/// assert!(!stop.stop(0.5));
/// assert!(!stop.stop(0.5));
/// assert!(stop.stop(0.5005));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StopList<T> {
    tolerance: T,
    window: usize,
    history: VecDeque<T>,
}

impl<T: Real> StopList<T> {
    /// A monitor that stops once `window` consecutive values lie within `tolerance` of the first
    /// of them.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    pub fn new(tolerance: T, window: usize) -> Self {
        assert!(window > 0, "StopList window must hold at least one value");
        Self {
            tolerance,
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    /// A monitor configured by `criterion`.
    ///
    /// Fails with [`Error::InvalidStopCriterion`] if the window is empty or the tolerance is
    /// negative or not finite.
    pub fn from_criterion(criterion: &StopCriterion) -> Result<Self> {
        let StopCriterion { tolerance, window } = *criterion;
        if window == 0 {
            return Err(Error::InvalidStopCriterion {
                reason: "window must hold at least one value".to_string(),
            });
        }
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(Error::InvalidStopCriterion {
                reason: format!("tolerance must be finite and non-negative, got {tolerance}"),
            });
        }
        Ok(Self::new(nalgebra::convert(tolerance), window))
    }

    pub fn tolerance(&self) -> T {
        self.tolerance
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Records `value` and reports whether the last `window` values have converged.
    pub fn stop(&mut self, value: T) -> bool {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(value);

        match self.history.front() {
            Some(&oldest) if self.history.len() == self.window => self
                .history
                .iter()
                .all(|&v| (v - oldest).abs() <= self.tolerance),
            _ => false,
        }
    }

    /// Forgets all recorded values.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
