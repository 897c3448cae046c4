//! Motor direction state machine
//!
//! `Stopped ⇄ Forward` and `Stopped ⇄ Backward` are direct transitions.
//! `Forward ⇄ Backward` is never taken directly: it is rewritten into a
//! stop, a settling hold, and then the new direction.

/// Motor drive direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Driving forward
    Forward,
    /// Driving backward
    Backward,
    /// Output off
    #[default]
    Stopped,
}

/// How to get from one direction to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Apply the target right away
    Direct(Direction),
    /// Stop, hold for the settling time, then apply the target
    ViaStop(Direction),
}

impl Direction {
    /// Direction implied by a signed speed (zero means stopped)
    pub fn from_speed(speed: i32) -> Self {
        match speed {
            s if s > 0 => Direction::Forward,
            s if s < 0 => Direction::Backward,
            _ => Direction::Stopped,
        }
    }

    /// Whether the motor is being driven
    pub fn is_moving(self) -> bool {
        self != Direction::Stopped
    }

    /// Whether going to `target` reverses the motor
    pub fn reverses(self, target: Direction) -> bool {
        matches!(
            (self, target),
            (Direction::Forward, Direction::Backward) | (Direction::Backward, Direction::Forward)
        )
    }

    /// Plan the transition to `target`
    pub fn transition(self, target: Direction) -> Transition {
        if self.reverses(target) {
            Transition::ViaStop(target)
        } else {
            Transition::Direct(target)
        }
    }
}
