//! Helmsman - Drive & Steering Controller Firmware
//!
//! Main firmware binary for RP2040-based rover drive boards. A host
//! computer sends drive setpoints over UART0; the controller applies them
//! to a DC motor and a steering servo behind reversal protection, a link
//! watchdog and stall detection, and streams encoder odometry back.
//!
//! Two executors run:
//!
//! - an interrupt executor on `SWI_IRQ_1` for the encoder edge task, so
//!   edges are counted even while the main loop is held;
//! - the thread executor for the link (main loop) and diagnostics tasks.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart, UartTx};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use helmsman_core::config::PinConfig;
use helmsman_core::Controller;
use helmsman_drivers::motor::PhaseEnableMotor;
use helmsman_drivers::servo::PwmServo;

mod board;
mod channels;
mod clock;
mod config;
mod tasks;

use crate::board::BOARD;
use crate::channels::ENCODER;
use crate::clock::EmbassyClock;
use crate::config::{
    controller_config, servo_config, BAUD_RATE, MOTOR_PWM_HZ, SERVO_FRAME_HZ, SYS_CLOCK_HZ,
};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

// The peripherals taken in `main` must be the ones the pin map names
const _: () = {
    core::assert!(BOARD.host_tx.pin == 0 && BOARD.host_rx.pin == 1, "host UART0 is PIN_0/PIN_1");
    core::assert!(BOARD.diag_tx.pin == 4, "diagnostics UART1 TX is PIN_4");
    core::assert!(BOARD.encoder_a.pin == 14 && BOARD.encoder_b.pin == 15, "encoder is PIN_14/PIN_15");
    core::assert!(BOARD.motor_pwm.pin == 16, "motor EN is PIN_16 (PWM slice 0 A)");
    core::assert!(BOARD.motor_dir.pin == 17, "motor PH is PIN_17");
    core::assert!(BOARD.servo.pin == 18, "servo is PIN_18 (PWM slice 1 A)");
};

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// PWM settings for a target frequency with a fixed integer divider
fn pwm_config(frequency_hz: u32, divider: u8) -> PwmConfig {
    let mut config = PwmConfig::default();
    config.divider = divider.into();
    config.top = (SYS_CLOCK_HZ / (divider as u32 * frequency_hz) - 1) as u16;
    config.compare_a = 0;
    config
}

fn pull(pin: PinConfig) -> Pull {
    if pin.pull_up {
        Pull::Up
    } else {
        Pull::None
    }
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Helmsman firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = controller_config();
    let config = match config.validate() {
        Ok(()) => config,
        Err(e) => {
            error!("Invalid controller configuration: {:?}", e);
            error!("Using built-in defaults");
            Default::default()
        }
    };
    info!("Controller config: {:?}", config);

    // Motor stage: EN on PWM (1 kHz class), PH as plain output, both low
    let motor_pwm = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, pwm_config(MOTOR_PWM_HZ, 10));
    let motor_dir = Output::new(p.PIN_17, Level::Low);
    let motor = PhaseEnableMotor::new(motor_pwm, motor_dir, BOARD.motor_dir.inverted);

    // Steering servo: 1 MHz tick, one frame per 20 ms, no pulse until centered
    let servo_pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_18, pwm_config(SERVO_FRAME_HZ, 125));
    let servo = PwmServo::new(servo_pwm, servo_config());

    info!("Motor and servo outputs initialized");

    // Encoder inputs
    let encoder_a = Input::new(p.PIN_14, pull(BOARD.encoder_a));
    let encoder_b = Input::new(p.PIN_15, pull(BOARD.encoder_b));

    // Host link on UART0
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    // Diagnostics on UART1, transmit only
    let mut diag_config = UartConfig::default();
    diag_config.baudrate = BAUD_RATE;
    let diag_tx = UartTx::new_blocking(p.UART1, p.PIN_4, diag_config);

    info!("UARTs initialized at {} baud", BAUD_RATE);

    let controller = Controller::new(config, motor, servo, Delay, EmbassyClock, &ENCODER);

    // Encoder edges preempt everything on the thread executor
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner.spawn(tasks::encoder_task(encoder_a, encoder_b)).unwrap();

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(tasks::diag_tx_task(diag_tx)).unwrap();
        spawner.spawn(tasks::link_task(controller, rx, tx)).unwrap();
        info!("All tasks spawned, firmware running");
    })
}
