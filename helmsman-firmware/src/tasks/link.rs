//! Host link task
//!
//! The controller main loop. Each pass drains whatever the host has sent,
//! dispatching complete lines as they close, then runs the time-driven
//! checks and writes any fault and status lines back to the host.

use core::fmt::Display;

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{with_timeout, Delay, Duration, Timer};
use embedded_io_async::{Read, Write};

use helmsman_core::actuator::SpeedChange;
use helmsman_core::safety::{StallCheck, WatchdogCheck};
use helmsman_core::{Controller, LineOutcome, ServiceReport};
use helmsman_drivers::motor::PhaseEnableMotor;
use helmsman_drivers::servo::PwmServo;
use helmsman_protocol::to_line;

use crate::channels::DIAG_CHANNEL;
use crate::clock::EmbassyClock;
use crate::config::{SERVO_CENTER_MS, SERVO_IDLE_MS};

/// Motor stage on the reference board
pub type Motor = PhaseEnableMotor<Pwm<'static>, Output<'static>>;

/// Steering servo on the reference board
pub type Servo = PwmServo<Pwm<'static>>;

/// The controller as wired on the reference board
pub type DriveController = Controller<'static, Motor, Servo, Delay, EmbassyClock>;

/// Read chunk size, matches the UART RX ring buffer
const RX_CHUNK: usize = 256;

/// How long a pass waits for host bytes before running the checks anyway
const POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Host link task
#[embassy_executor::task]
pub async fn link_task(mut controller: DriveController, mut rx: BufferedUartRx, mut tx: BufferedUartTx) {
    info!("Link task started");

    // Servo pin idles low before the first pulse, then gets time to reach center
    Timer::after_millis(SERVO_IDLE_MS).await;
    if let Err(e) = controller.start() {
        error!("Failed to drive outputs to rest: {:?}", e);
    }
    Timer::after_millis(SERVO_CENTER_MS).await;

    info!("Controller ready");

    let mut buf = [0u8; RX_CHUNK];

    loop {
        match with_timeout(POLL_TIMEOUT, rx.read(&mut buf)).await {
            Ok(Ok(n)) => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    match controller.receive_byte(byte) {
                        Ok(Some(outcome)) => handle_outcome(&outcome, controller.overflow_count()),
                        Ok(None) => {}
                        Err(e) => error!("Actuator error: {:?}", e),
                    }
                }
            }
            Ok(Err(e)) => {
                warn!("Host UART read error: {:?}", e);
            }
            Err(_) => {
                // Quiet link
            }
        }

        let report = controller.service();
        log_service(&report);

        if let Some(fault) = report.fault {
            send(&mut tx, &fault).await;
        }
        if let Some(status) = report.status {
            send(&mut tx, &status).await;
        }
    }
}

/// Log a dispatched line and queue its diagnostic, if any
fn handle_outcome(outcome: &LineOutcome, overflows: u32) {
    match outcome {
        LineOutcome::Drive {
            speed,
            steer,
            motor,
        } => {
            trace!("Drive: speed={} steer={}", speed, steer);
            match motor {
                Some(SpeedChange::Reversed) => debug!("Reversal completed after settle hold"),
                Some(SpeedChange::Deferred) => debug!("Reversal pending, motor held stopped"),
                _ => {}
            }
        }
        LineOutcome::EmergencyStop => info!("Emergency stop"),
        LineOutcome::EncoderReset => debug!("Encoder reset"),
        LineOutcome::Rejected { error, .. } => warn!("Rejected line: {:?}", error),
        LineOutcome::Overflow { .. } => debug!("Line overflow, {} discarded so far", overflows),
    }

    if let Some(diagnostic) = outcome.diagnostic() {
        match to_line(&diagnostic) {
            Ok(line) => {
                if DIAG_CHANNEL.try_send(line).is_err() {
                    warn!("Diagnostics channel full, dropping line");
                }
            }
            Err(e) => warn!("Diagnostic did not fit: {:?}", e),
        }
    }
}

fn log_service(report: &ServiceReport) {
    if report.reversal_completed {
        debug!("Deferred reversal applied");
    }
    if report.watchdog == WatchdogCheck::Tripped {
        warn!("[WDG] No command for too long, motor stopped");
    }
    if report.stall == (StallCheck::Stalled { first: true }) {
        warn!("Motor stall: encoder idle while driving");
    }
    if let Some(e) = report.error {
        error!("Actuator error during service: {:?}", e);
    }
}

/// Write one line to the host
async fn send<M: Display>(tx: &mut BufferedUartTx, message: &M) {
    match to_line(message) {
        Ok(line) => {
            if let Err(e) = tx.write_all(line.as_bytes()).await {
                warn!("Host UART write error: {:?}", e);
            }
        }
        Err(e) => warn!("Outbound line did not fit: {:?}", e),
    }
}
