//! Host-side test doubles
//!
//! A manually driven clock, a delay that advances that clock instead of
//! sleeping, and motor/servo drivers that record every output change with
//! the time it happened.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::state::Direction;
use crate::traits::{Clock, MotorDriver, ServoDriver};

/// Shared millisecond clock moved by hand
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

/// Delay that moves a [`ManualClock`] forward and remembers each hold
#[derive(Debug, Clone)]
pub struct ClockDelay {
    clock: ManualClock,
    holds_ms: Rc<RefCell<Vec<u32>>>,
}

impl ClockDelay {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            holds_ms: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Every delay requested so far, in ms
    pub fn holds(&self) -> Vec<u32> {
        self.holds_ms.borrow().clone()
    }
}

impl DelayNs for ClockDelay {
    fn delay_ns(&mut self, ns: u32) {
        let ms = ns.div_ceil(1_000_000);
        self.holds_ms.borrow_mut().push(ms);
        self.clock.advance(ms);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.holds_ms.borrow_mut().push(ms);
        self.clock.advance(ms);
    }
}

/// One recorded motor output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorOutput {
    pub at_ms: u32,
    pub direction: Direction,
    pub duty: u8,
}

/// Motor driver that logs instead of switching pins
#[derive(Debug, Clone)]
pub struct RecordingMotor {
    clock: ManualClock,
    outputs: Rc<RefCell<Vec<MotorOutput>>>,
    fail: Rc<Cell<bool>>,
}

/// Error returned by the recording drivers when told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedFault;

impl RecordingMotor {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            outputs: Rc::new(RefCell::new(Vec::new())),
            fail: Rc::new(Cell::new(false)),
        }
    }

    pub fn outputs(&self) -> Vec<MotorOutput> {
        self.outputs.borrow().clone()
    }

    pub fn last(&self) -> Option<MotorOutput> {
        self.outputs.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.outputs.borrow_mut().clear();
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl MotorDriver for RecordingMotor {
    type Error = InjectedFault;

    fn drive(&mut self, direction: Direction, duty_percent: u8) -> Result<(), Self::Error> {
        if self.fail.get() {
            return Err(InjectedFault);
        }
        let duty = if direction == Direction::Stopped { 0 } else { duty_percent };
        self.outputs.borrow_mut().push(MotorOutput {
            at_ms: self.clock.now_ms(),
            direction,
            duty,
        });
        Ok(())
    }
}

/// Servo driver that logs every angle written
#[derive(Debug, Clone, Default)]
pub struct RecordingServo {
    angles: Rc<RefCell<Vec<u8>>>,
    fail: Rc<Cell<bool>>,
}

impl RecordingServo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angles(&self) -> Vec<u8> {
        self.angles.borrow().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl ServoDriver for RecordingServo {
    type Error = InjectedFault;

    fn write_angle(&mut self, degrees: u8) -> Result<(), Self::Error> {
        if self.fail.get() {
            return Err(InjectedFault);
        }
        self.angles.borrow_mut().push(degrees);
        Ok(())
    }
}
