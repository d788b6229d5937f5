//! Dead-band on/off decision logic.

use std::fmt;

use log::warn;

use crate::{
    error::{FanCtlError, Result},
    temperature::Temperature,
};

/// Binary fan state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanState {
    #[default]
    Off,
    On,
}

impl FanState {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Logical level of the GPIO pin for this state.
    pub const fn level(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }
}

impl fmt::Display for FanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::On => "on",
        })
    }
}

/// Switching thresholds in °C: the fan starts at `high` and stops at `low`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    low: Temperature,
    high: Temperature,
}

impl Thresholds {
    /// Builds thresholds, rejecting `low > high` and non-finite values.
    ///
    /// `low == high` is accepted: the controller degrades to switching at a
    /// single point, which works but oscillates around it.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(FanCtlError::ConfigurationInvalid(format!(
                "thresholds must be finite (low={low}, high={high})"
            )));
        }
        if low > high {
            return Err(FanCtlError::ConfigurationInvalid(format!(
                "low threshold {low:.2} is above high threshold {high:.2}"
            )));
        }
        if low == high {
            warn!("low and high thresholds are both {low:.2}, fan will switch at a single point");
        }

        Ok(Self {
            low: low.into(),
            high: high.into(),
        })
    }

    pub const fn low(&self) -> Temperature {
        self.low
    }

    pub const fn high(&self) -> Temperature {
        self.high
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: Temperature::from_celsius(50.0),
            high: Temperature::from_celsius(70.0),
        }
    }
}

/// Pure transition function.
///
/// Returns `Some(next)` only when the state must flip:
/// `Off -> On` iff `temp >= high`, `On -> Off` iff `temp <= low`.
pub fn evaluate(current: FanState, temp: Temperature, thresholds: &Thresholds) -> Option<FanState> {
    match current {
        FanState::Off if temp >= thresholds.high => Some(FanState::On),
        FanState::On if temp <= thresholds.low => Some(FanState::Off),
        _ => None,
    }
}

/// Holds the current fan state and applies [`evaluate`] to it.
#[derive(Debug, Clone)]
pub struct HysteresisController {
    state: FanState,
    thresholds: Thresholds,
}

impl HysteresisController {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            state: FanState::Off,
            thresholds,
        }
    }

    pub const fn state(&self) -> FanState {
        self.state
    }

    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Decision for `temp` against the current state, without committing it.
    pub fn decide(&self, temp: Temperature) -> Option<FanState> {
        evaluate(self.state, temp, &self.thresholds)
    }

    /// Records a state the actuator has been driven to.
    pub fn commit(&mut self, state: FanState) {
        self.state = state;
    }

    /// Decides and commits in one step.
    pub fn update(&mut self, temp: Temperature) -> Option<FanState> {
        let next = self.decide(temp)?;
        self.commit(next);
        Some(next)
    }
}
