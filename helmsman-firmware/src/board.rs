//! Board pin map
//!
//! Pin assignments for the reference drive board (Raspberry Pi Pico).
//! `main` takes the matching peripherals and checks at compile time that
//! they agree with this map.
//!
//! | Role          | GPIO | Peripheral        |
//! |---------------|------|-------------------|
//! | Host TX / RX  | 0/1  | UART0             |
//! | Diagnostics   | 4    | UART1 TX          |
//! | Encoder A / B | 14/15| inputs, pull-up   |
//! | Motor EN      | 16   | PWM slice 0 A     |
//! | Motor PH      | 17   | output            |
//! | Servo         | 18   | PWM slice 1 A     |

use helmsman_core::config::{BoardPins, PinConfig};

use crate::config::PHASE_INVERTED;

pub const BOARD: BoardPins = BoardPins {
    motor_pwm: PinConfig::new(16),
    motor_dir: PinConfig::new(17).with_inversion(PHASE_INVERTED),
    encoder_a: PinConfig::with_pullup(14),
    encoder_b: PinConfig::with_pullup(15),
    servo: PinConfig::new(18),
    host_tx: PinConfig::new(0),
    host_rx: PinConfig::new(1),
    diag_tx: PinConfig::new(4),
};

// Pin map is sound: every role on its own existing GPIO
const _: () = assert!(BOARD.validate().is_ok(), "invalid board pin map");
