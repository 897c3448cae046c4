//! Motor actuator with reversal protection
//!
//! Translates a signed speed into a direction and a duty and pushes them
//! to a [`MotorDriver`]. Switching straight from one direction to the
//! other lets the motor's back-EMF fight the driver, so a reversal is
//! always split into a stop, a settling hold and then the new direction:
//!
//! ```text
//! Forward ──► Stopped ──(settle)──► Backward
//! ```
//!
//! With [`ReversalPolicy::Blocking`] the hold is a plain delay inside
//! [`MotorActuator::set_speed`]. With [`ReversalPolicy::Deferred`] the
//! actuator parks in a [`Stopping`] state and [`MotorActuator::poll`]
//! finishes the reversal once the hold has elapsed, so the caller never
//! sleeps.

use embedded_hal::delay::DelayNs;

use crate::config::{ControllerConfig, ReversalPolicy};
use crate::state::{Direction, Transition};
use crate::traits::{ActuatorError, MotorDriver};

/// Result of a speed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedChange {
    /// Output updated immediately
    Applied,
    /// Reversal completed after a blocking hold
    Reversed,
    /// Motor is held stopped; `poll()` applies the new direction later
    Deferred,
}

/// Pending deferred reversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stopping {
    /// Time at which the new direction may be applied (ms)
    pub resume_at: u32,
    /// Direction to apply once settled
    pub target: Direction,
    /// Duty to apply once settled
    pub duty: u8,
}

impl Stopping {
    fn is_due(&self, now_ms: u32) -> bool {
        // Signed difference keeps the comparison valid across the u32 wrap
        now_ms.wrapping_sub(self.resume_at) as i32 >= 0
    }
}

/// Direction and duty control on top of a motor driver
pub struct MotorActuator<M, D> {
    driver: M,
    delay: D,
    direction: Direction,
    duty: u8,
    max_duty_percent: u8,
    settle_ms: u32,
    policy: ReversalPolicy,
    stopping: Option<Stopping>,
}

impl<M: MotorDriver, D: DelayNs> MotorActuator<M, D> {
    /// Wrap a driver; the output is not touched until the first command
    pub fn new(driver: M, delay: D, config: &ControllerConfig) -> Self {
        Self {
            driver,
            delay,
            direction: Direction::Stopped,
            duty: 0,
            max_duty_percent: config.max_duty_percent,
            settle_ms: config.reversal_settle_ms,
            policy: config.reversal_policy,
            stopping: None,
        }
    }

    /// Direction currently driven
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Duty currently driven (percent)
    pub fn duty(&self) -> u8 {
        self.duty
    }

    /// Deferred reversal in progress, if any
    pub fn stopping(&self) -> Option<Stopping> {
        self.stopping
    }

    /// Duty for a speed: magnitude capped at the configured maximum
    fn duty_for(&self, speed: i8) -> u8 {
        speed.unsigned_abs().min(self.max_duty_percent)
    }

    fn apply(&mut self, direction: Direction, duty: u8) -> Result<(), ActuatorError> {
        let duty = if direction.is_moving() { duty } else { 0 };
        self.driver
            .drive(direction, duty)
            .map_err(|_| ActuatorError::Motor)?;
        self.direction = direction;
        self.duty = duty;
        Ok(())
    }

    /// Drive at a signed speed (positive forward, negative backward, zero stop)
    ///
    /// `now_ms` is only used to time a deferred reversal.
    pub fn set_speed(&mut self, speed: i8, now_ms: u32) -> Result<SpeedChange, ActuatorError> {
        let target = Direction::from_speed(speed as i32);
        let duty = self.duty_for(speed);

        if let Some(stopping) = self.stopping.as_mut() {
            if target.is_moving() {
                // Still settling: retarget but keep the hold
                stopping.target = target;
                stopping.duty = duty;
                return Ok(SpeedChange::Deferred);
            }
            self.stopping = None;
        }

        match self.direction.transition(target) {
            Transition::Direct(direction) => {
                self.apply(direction, duty)?;
                Ok(SpeedChange::Applied)
            }
            Transition::ViaStop(direction) => {
                self.apply(Direction::Stopped, 0)?;
                match self.policy {
                    ReversalPolicy::Blocking => {
                        self.delay.delay_ms(self.settle_ms);
                        self.apply(direction, duty)?;
                        Ok(SpeedChange::Reversed)
                    }
                    ReversalPolicy::Deferred => {
                        self.stopping = Some(Stopping {
                            resume_at: now_ms.wrapping_add(self.settle_ms),
                            target: direction,
                            duty,
                        });
                        Ok(SpeedChange::Deferred)
                    }
                }
            }
        }
    }

    /// Finish a deferred reversal whose hold has elapsed
    ///
    /// Returns `true` when the new direction was applied.
    pub fn poll(&mut self, now_ms: u32) -> Result<bool, ActuatorError> {
        match self.stopping {
            Some(stopping) if stopping.is_due(now_ms) => {
                self.apply(stopping.target, stopping.duty)?;
                self.stopping = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Turn the output off and drop any pending reversal
    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.stopping = None;
        self.apply(Direction::Stopped, 0)
    }
}
