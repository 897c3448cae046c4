//! Drive controller
//!
//! Ties the protocol, actuators, encoder and safety checks into the two
//! operations the firmware main loop calls:
//!
//! - [`Controller::receive_byte`] for every byte read from the host link.
//!   Complete lines are interpreted and applied immediately, in arrival
//!   order.
//! - [`Controller::service`] once per loop pass, after the pending input
//!   has been drained. It reads the clock itself, so the watchdog always
//!   sees a time at or after the last accepted line.
//!
//! ```text
//! bytes ─► LineFramer ─► Command ─┬─► MotorActuator
//!                                 ├─► SteeringActuator
//!                                 └─► QuadratureDecoder::reset
//!
//! service ─► deferred reversal ─► Watchdog ─► StallMonitor ─► StatusReporter
//! ```
//!
//! Nothing here blocks except a [`ReversalPolicy::Blocking`] reversal,
//! which holds the caller for the settling time.
//!
//! [`ReversalPolicy::Blocking`]: crate::config::ReversalPolicy::Blocking

use embedded_hal::delay::DelayNs;
use helmsman_protocol::{
    Command, Diagnostic, FaultCode, FramerEvent, Line, LineFramer, ProtocolError, StatusReport,
    MAX_LINE_LEN,
};

use crate::actuator::{MotorActuator, SpeedChange, SteeringActuator};
use crate::config::{clamp_speed, clamp_steer, ControllerConfig, StallPolicy, STEER_CENTER};
use crate::encoder::QuadratureDecoder;
use crate::safety::{StallCheck, StallMonitor, Watchdog, WatchdogCheck};
use crate::state::{ControllerState, Snapshot};
use crate::telemetry::StatusReporter;
use crate::traits::{ActuatorError, Clock, MotorDriver, ServoDriver};

/// What a complete (or discarded) line did
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineOutcome {
    /// Drive setpoint accepted, values after clamping
    ///
    /// `motor` is `None` when the speed matched the previous one and the
    /// output was left alone.
    Drive {
        speed: i8,
        steer: u8,
        motor: Option<SpeedChange>,
    },
    /// Motor stopped and steering centered
    EmergencyStop,
    /// Encoder tally zeroed
    EncoderReset,
    /// Line refused; state unchanged
    Rejected { error: ProtocolError, line: Line },
    /// Line outgrew the buffer and was dropped
    Overflow { report: bool },
}

impl LineOutcome {
    /// Debug-channel message for this outcome, if one is due
    pub fn diagnostic(&self) -> Option<Diagnostic<'_>> {
        match self {
            LineOutcome::Rejected { error, line } => Some(Diagnostic::for_error(*error, line)),
            LineOutcome::Overflow { report: true } => Some(Diagnostic::Overflow),
            _ => None,
        }
    }
}

/// What one service pass found and did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServiceReport {
    /// Time the pass ran at (ms)
    pub now_ms: u32,
    /// A deferred reversal was completed
    pub reversal_completed: bool,
    /// Watchdog verdict
    pub watchdog: WatchdogCheck,
    /// Stall monitor verdict
    pub stall: StallCheck,
    /// Fault line to send to the host
    pub fault: Option<FaultCode>,
    /// Status line to send to the host
    pub status: Option<StatusReport>,
    /// An actuator refused a safety action during the pass
    pub error: Option<ActuatorError>,
}

/// The drive controller
pub struct Controller<'e, M, S, D, C> {
    config: ControllerConfig,
    clock: C,
    framer: LineFramer,
    state: ControllerState,
    motor: MotorActuator<M, D>,
    steering: SteeringActuator<S>,
    encoder: &'e QuadratureDecoder,
    watchdog: Watchdog,
    stall: StallMonitor,
    reporter: StatusReporter,
    overflows: u32,
}

impl<'e, M, S, D, C> Controller<'e, M, S, D, C>
where
    M: MotorDriver,
    S: ServoDriver,
    D: DelayNs,
    C: Clock,
{
    /// Assemble a controller; outputs are untouched until [`start`](Self::start)
    pub fn new(
        config: ControllerConfig,
        motor: M,
        servo: S,
        delay: D,
        clock: C,
        encoder: &'e QuadratureDecoder,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            motor: MotorActuator::new(motor, delay, &config),
            steering: SteeringActuator::new(servo),
            state: ControllerState::new(now),
            watchdog: Watchdog::new(config.watchdog_timeout_ms),
            stall: StallMonitor::new(config.stall_check_interval_ms, now, encoder.count()),
            reporter: StatusReporter::new(config.status_interval_ms, now),
            framer: LineFramer::new(),
            overflows: 0,
            config,
            clock,
            encoder,
        }
    }

    /// Drive the outputs to their safe power-on state and start the timers
    pub fn start(&mut self) -> Result<(), ActuatorError> {
        self.motor.stop()?;
        self.steering.center()?;

        let now = self.clock.now_ms();
        self.state = ControllerState::new(now);
        self.stall = StallMonitor::new(self.config.stall_check_interval_ms, now, self.encoder.count());
        self.reporter = StatusReporter::new(self.config.status_interval_ms, now);
        Ok(())
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Lines discarded for length since startup
    pub fn overflow_count(&self) -> u32 {
        self.overflows
    }

    /// Consistent view for telemetry and logs
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            encoder: self.encoder.count(),
            speed: self.state.commanded_speed,
            steer: self.state.commanded_steer,
            direction: self.motor.direction(),
            watchdog_tripped: self.state.watchdog_tripped,
        }
    }

    /// Feed one byte from the host link
    pub fn receive_byte(&mut self, byte: u8) -> Result<Option<LineOutcome>, ActuatorError> {
        match self.framer.push(byte) {
            None => Ok(None),
            Some(FramerEvent::Line(line)) => self.handle_line(&line).map(Some),
            Some(FramerEvent::Overflow) => {
                self.overflows = self.overflows.wrapping_add(1);
                Ok(Some(LineOutcome::Overflow {
                    report: self.config.report_overflow,
                }))
            }
        }
    }

    /// Interpret and apply one complete line (terminator stripped)
    pub fn handle_line(&mut self, line: &[u8]) -> Result<LineOutcome, ActuatorError> {
        let now = self.clock.now_ms();

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(error) => return Ok(rejected(error, line)),
        };

        // Every recognised line proves the host is alive, even a bad `C:`
        self.watchdog.feed(&mut self.state, now);

        match command {
            Command::Drive { speed, steer } => {
                let speed = clamp_speed(speed);
                let steer = clamp_steer(steer);

                let mut motor = None;
                if speed != self.state.commanded_speed {
                    motor = Some(self.motor.set_speed(speed, now)?);
                    self.state.commanded_speed = speed;
                }
                if steer != self.state.commanded_steer {
                    self.steering.set_angle(steer as i32)?;
                    self.state.commanded_steer = steer;
                }

                Ok(LineOutcome::Drive {
                    speed,
                    steer,
                    motor,
                })
            }
            Command::EmergencyStop => {
                self.motor.stop()?;
                self.state.commanded_speed = 0;
                self.steering.center()?;
                self.state.commanded_steer = STEER_CENTER;
                Ok(LineOutcome::EmergencyStop)
            }
            Command::ResetEncoder => {
                self.encoder.reset();
                Ok(LineOutcome::EncoderReset)
            }
            Command::Malformed { raw } => Ok(rejected(ProtocolError::BadDriveCommand, raw)),
        }
    }

    /// One main-loop pass of the time-driven checks
    ///
    /// Call after draining the host link. Faults and actuator errors are
    /// reported, never propagated, so one failed pass cannot skip the
    /// status line.
    pub fn service(&mut self) -> ServiceReport {
        let now = self.clock.now_ms();
        let mut error = None;

        let reversal_completed = self.motor.poll(now).unwrap_or_else(|e| {
            error = Some(e);
            false
        });

        let mut fault = None;
        let watchdog = self.watchdog.check(&mut self.state, now);
        match watchdog {
            WatchdogCheck::Tripped => {
                fault = Some(FaultCode::WatchdogTimeout);
                if let Err(e) = self.motor.stop() {
                    error = Some(e);
                }
            }
            WatchdogCheck::Latched if self.motor.direction().is_moving() => {
                // A stop that failed at trip time is retried every pass
                if let Err(e) = self.motor.stop() {
                    error = Some(e);
                }
            }
            _ => {}
        }

        let running = self.state.commanded_speed != 0;
        let stall = self.stall.check(now, self.encoder.count(), running);
        if let StallCheck::Stalled { first: true } = stall {
            match self.config.stall_policy {
                StallPolicy::Ignore => {}
                StallPolicy::Report => fault = Some(FaultCode::Stall),
                StallPolicy::Stop => {
                    fault = Some(FaultCode::Stall);
                    self.state.commanded_speed = 0;
                    if let Err(e) = self.motor.stop() {
                        error = Some(e);
                    }
                }
            }
        }

        let snapshot = self.snapshot();
        let status = self.reporter.poll(now, &snapshot);

        ServiceReport {
            now_ms: now,
            reversal_completed,
            watchdog,
            stall,
            fault,
            status,
            error,
        }
    }
}

fn rejected(error: ProtocolError, line: &[u8]) -> LineOutcome {
    let kept = &line[..line.len().min(MAX_LINE_LEN)];
    LineOutcome::Rejected {
        error,
        line: Line::from_slice(kept).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReversalPolicy;
    use crate::state::Direction;
    use crate::testing::{ClockDelay, ManualClock, MotorOutput, RecordingMotor, RecordingServo};
    use proptest::prelude::*;

    type TestController<'e> = Controller<'e, RecordingMotor, RecordingServo, ClockDelay, ManualClock>;

    struct Rig {
        clock: ManualClock,
        motor: RecordingMotor,
        servo: RecordingServo,
        delay: ClockDelay,
    }

    impl Rig {
        fn new() -> Self {
            let clock = ManualClock::new(1000);
            Self {
                motor: RecordingMotor::new(clock.clone()),
                servo: RecordingServo::new(),
                delay: ClockDelay::new(clock.clone()),
                clock,
            }
        }

        fn controller<'e>(&self, config: ControllerConfig, encoder: &'e QuadratureDecoder) -> TestController<'e> {
            let mut controller = Controller::new(
                config,
                self.motor.clone(),
                self.servo.clone(),
                self.delay.clone(),
                self.clock.clone(),
                encoder,
            );
            controller.start().unwrap();
            controller
        }
    }

    fn send(controller: &mut TestController<'_>, text: &str) -> std::vec::Vec<LineOutcome> {
        text.bytes()
            .filter_map(|b| controller.receive_byte(b).unwrap())
            .collect()
    }

    fn out(at_ms: u32, direction: Direction, duty: u8) -> MotorOutput {
        MotorOutput {
            at_ms,
            direction,
            duty,
        }
    }

    /// Walk the encoder forward by `ticks` single steps
    fn turn(encoder: &QuadratureDecoder, ticks: usize) {
        let cycle = [(true, false), (true, true), (false, true), (false, false)];
        for &(a, b) in cycle.iter().cycle().take(ticks) {
            encoder.on_edge(a, b);
        }
    }

    #[test]
    fn test_startup_sequence() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let controller = rig.controller(ControllerConfig::default(), &encoder);

        assert_eq!(rig.motor.outputs(), [out(1000, Direction::Stopped, 0)]);
        assert_eq!(rig.servo.angles(), [90]);
        let snap = controller.snapshot();
        assert_eq!((snap.speed, snap.steer, snap.direction), (0, 90, Direction::Stopped));
    }

    #[test]
    fn test_drive_and_status() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        let outcomes = send(&mut controller, "C:50,120\n");
        assert_eq!(
            outcomes,
            [LineOutcome::Drive {
                speed: 50,
                steer: 120,
                motor: Some(SpeedChange::Applied),
            }]
        );
        assert_eq!(rig.motor.last(), Some(out(1000, Direction::Forward, 50)));
        assert_eq!(rig.servo.angles(), [90, 120]);

        rig.clock.advance(20);
        let report = controller.service();
        assert_eq!(report.status.unwrap().to_string(), "S:0,50,120");
        assert_eq!(report.fault, None);
    }

    #[test]
    fn test_reversal_scenario() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);
        rig.motor.clear();

        send(&mut controller, "C:50,90\n");
        let outcomes = send(&mut controller, "C:-50,90\n");
        assert_eq!(
            outcomes,
            [LineOutcome::Drive {
                speed: -50,
                steer: 90,
                motor: Some(SpeedChange::Reversed),
            }]
        );
        assert_eq!(
            rig.motor.outputs(),
            [
                out(1000, Direction::Forward, 50),
                out(1000, Direction::Stopped, 0),
                out(1030, Direction::Backward, 50),
            ]
        );
        // Steering never changed from center, so it was never rewritten
        assert_eq!(rig.servo.angles(), [90]);

        // The hold advanced the clock; the watchdog must not see it as silence
        let report = controller.service();
        assert_eq!(report.watchdog, WatchdogCheck::Alive);
    }

    #[test]
    fn test_unchanged_values_not_rewritten() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        send(&mut controller, "C:40,100\n");
        let writes = rig.motor.outputs().len();
        let outcomes = send(&mut controller, "C:40,100\n");
        assert_eq!(
            outcomes,
            [LineOutcome::Drive {
                speed: 40,
                steer: 100,
                motor: None,
            }]
        );
        assert_eq!(rig.motor.outputs().len(), writes);
        assert_eq!(rig.servo.angles(), [90, 100]);
    }

    #[test]
    fn test_clamps_out_of_range() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        send(&mut controller, "C:250,-30\n");
        let snap = controller.snapshot();
        assert_eq!((snap.speed, snap.steer), (100, 0));
        assert_eq!(rig.motor.last(), Some(out(1000, Direction::Forward, 100)));
    }

    #[test]
    fn test_watchdog_trips_once() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        send(&mut controller, "C:60,90\n");
        rig.clock.advance(200);
        assert_eq!(controller.service().watchdog, WatchdogCheck::Alive);

        rig.clock.advance(1);
        let report = controller.service();
        assert_eq!(report.watchdog, WatchdogCheck::Tripped);
        assert_eq!(report.fault, Some(FaultCode::WatchdogTimeout));
        assert_eq!(rig.motor.last(), Some(out(1201, Direction::Stopped, 0)));

        let snap = controller.snapshot();
        assert!(snap.watchdog_tripped);
        assert_eq!(snap.speed, 0);

        let mut faults = 0;
        for _ in 0..50 {
            rig.clock.advance(20);
            let report = controller.service();
            faults += report.fault.is_some() as usize;
            assert_eq!(report.status.map(|s| s.speed), Some(0));
        }
        assert_eq!(faults, 0);

        // Next accepted line recovers
        send(&mut controller, "C:60,90\n");
        assert!(!controller.snapshot().watchdog_tripped);
        assert_eq!(rig.motor.last().map(|o| o.direction), Some(Direction::Forward));
    }

    #[test]
    fn test_watchdog_stop_retried_after_failure() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        send(&mut controller, "C:60,90\n");
        rig.motor.set_failing(true);
        rig.clock.advance(250);
        let report = controller.service();
        assert_eq!(report.fault, Some(FaultCode::WatchdogTimeout));
        assert_eq!(report.error, Some(ActuatorError::Motor));

        rig.motor.set_failing(false);
        rig.clock.advance(1);
        let report = controller.service();
        assert_eq!(report.watchdog, WatchdogCheck::Latched);
        assert_eq!(report.error, None);
        assert_eq!(controller.snapshot().direction, Direction::Stopped);
    }

    #[test]
    fn test_reset_encoder() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        turn(&encoder, 37);
        assert_eq!(controller.snapshot().encoder, 37);
        assert_eq!(send(&mut controller, "R\n"), [LineOutcome::EncoderReset]);

        rig.clock.advance(20);
        assert_eq!(controller.service().status.map(|s| s.encoder), Some(0));
    }

    #[test]
    fn test_emergency_stop() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        send(&mut controller, "C:-70,30\n");
        assert_eq!(send(&mut controller, "E\r\n"), [LineOutcome::EmergencyStop]);

        let snap = controller.snapshot();
        assert_eq!((snap.speed, snap.steer, snap.direction), (0, 90, Direction::Stopped));
        assert_eq!(rig.servo.angles(), [90, 30, 90]);

        // Starting forward again needs no hold
        send(&mut controller, "C:70,90\n");
        assert!(rig.delay.holds().is_empty());
    }

    #[test]
    fn test_malformed_drive_keeps_link_alive() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        send(&mut controller, "C:30,60\n");
        rig.clock.advance(150);
        let outcomes = send(&mut controller, "C:fast,left\n");
        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].diagnostic().unwrap().to_string(),
            "[ERR] Bad C cmd: C:fast,left"
        );

        let snap = controller.snapshot();
        assert_eq!((snap.speed, snap.steer), (30, 60));

        // Liveness was refreshed at 1150
        rig.clock.advance(100);
        assert_eq!(controller.service().watchdog, WatchdogCheck::Alive);
    }

    #[test]
    fn test_unknown_command_is_not_liveness() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        send(&mut controller, "C:30,60\n");
        rig.clock.advance(150);
        let outcomes = send(&mut controller, "HELLO\n");
        assert_eq!(
            outcomes[0].diagnostic().unwrap().to_string(),
            "[ERR] Unknown cmd: HELLO"
        );

        rig.clock.advance(51);
        assert_eq!(controller.service().watchdog, WatchdogCheck::Tripped);
    }

    #[test]
    fn test_overflow_discards_and_recovers() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        let mut input = "x".repeat(MAX_LINE_LEN + 1);
        input.push_str("E\n");
        let outcomes = send(&mut controller, &input);
        assert_eq!(
            outcomes,
            [LineOutcome::Overflow { report: false }, LineOutcome::EmergencyStop]
        );
        assert_eq!(outcomes[0].diagnostic(), None);
        assert_eq!(controller.overflow_count(), 1);
    }

    #[test]
    fn test_overflow_reported_when_configured() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let config = ControllerConfig {
            report_overflow: true,
            ..Default::default()
        };
        let mut controller = rig.controller(config, &encoder);

        let outcomes = send(&mut controller, &"y".repeat(MAX_LINE_LEN + 1));
        assert_eq!(
            outcomes[0].diagnostic().unwrap().to_string(),
            "[ERR] Line overflow"
        );
    }

    #[test]
    fn test_several_lines_in_one_pass() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        let outcomes = send(&mut controller, "C:10,10\nC:20,20\nR\n");
        assert_eq!(outcomes.len(), 3);
        rig.clock.advance(20);
        assert_eq!(
            controller.service().status.unwrap().to_string(),
            "S:0,20,20"
        );
    }

    #[test]
    fn test_stall_reported_once() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        let mut faults = std::vec::Vec::new();
        for _ in 0..30 {
            send(&mut controller, "C:50,90\n");
            rig.clock.advance(20);
            faults.extend(controller.service().fault);
        }
        assert_eq!(faults, [FaultCode::Stall]);
        // Report policy keeps driving
        assert_eq!(controller.snapshot().direction, Direction::Forward);
    }

    #[test]
    fn test_moving_wheel_is_not_a_stall() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        for _ in 0..30 {
            send(&mut controller, "C:50,90\n");
            turn(&encoder, 3);
            rig.clock.advance(20);
            assert_eq!(controller.service().fault, None);
        }
    }

    #[test]
    fn test_stall_stop_policy() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let config = ControllerConfig {
            stall_policy: StallPolicy::Stop,
            ..Default::default()
        };
        let mut controller = rig.controller(config, &encoder);

        send(&mut controller, "C:50,90\n");
        rig.clock.advance(200);
        let report = controller.service();
        assert_eq!(report.fault, Some(FaultCode::Stall));

        let snap = controller.snapshot();
        assert_eq!((snap.speed, snap.direction), (0, Direction::Stopped));
        assert!(!snap.watchdog_tripped);
    }

    #[test]
    fn test_stall_ignore_policy() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let config = ControllerConfig {
            stall_policy: StallPolicy::Ignore,
            ..Default::default()
        };
        let mut controller = rig.controller(config, &encoder);

        send(&mut controller, "C:50,90\n");
        rig.clock.advance(200);
        let report = controller.service();
        assert_eq!(report.stall, StallCheck::Stalled { first: true });
        assert_eq!(report.fault, None);
    }

    #[test]
    fn test_start_after_idle_is_not_a_stall() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let config = ControllerConfig {
            stall_policy: StallPolicy::Stop,
            ..Default::default()
        };
        let mut controller = rig.controller(config, &encoder);

        for _ in 0..50 {
            send(&mut controller, "C:0,90\n");
            rig.clock.advance(20);
            assert_eq!(controller.service().fault, None);
        }

        send(&mut controller, "C:50,90\n");
        let report = controller.service();
        assert_eq!(report.stall, StallCheck::Skipped);
        assert_eq!(report.fault, None);
        assert_eq!(controller.snapshot().direction, Direction::Forward);

        // A wheel that really stays put is caught one interval after the start
        let mut faults = std::vec::Vec::new();
        for _ in 0..10 {
            send(&mut controller, "C:50,90\n");
            rig.clock.advance(20);
            faults.extend(controller.service().fault);
        }
        assert_eq!(faults, [FaultCode::Stall]);
        assert_eq!(controller.snapshot().direction, Direction::Stopped);
    }

    #[test]
    fn test_any_recognised_line_clears_tripped_watchdog() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        send(&mut controller, "C:40,90\n");
        rig.clock.advance(201);
        assert_eq!(controller.service().watchdog, WatchdogCheck::Tripped);

        for line in ["C:fast,left\n", "E\n", "R\n"] {
            assert!(controller.state().watchdog_tripped);
            send(&mut controller, line);
            assert!(!controller.state().watchdog_tripped, "after {:?}", line);

            // Fresh timeout from the line just accepted
            rig.clock.advance(200);
            let report = controller.service();
            assert_eq!(report.watchdog, WatchdogCheck::Alive, "after {:?}", line);
            assert_eq!(report.fault, None);

            rig.clock.advance(1);
            let report = controller.service();
            assert_eq!(report.watchdog, WatchdogCheck::Tripped);
            assert_eq!(report.fault, Some(FaultCode::WatchdogTimeout));
        }
    }

    #[test]
    fn test_unknown_line_does_not_clear_tripped_watchdog() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        rig.clock.advance(201);
        assert_eq!(controller.service().watchdog, WatchdogCheck::Tripped);

        send(&mut controller, "HELLO\n");
        assert!(controller.state().watchdog_tripped);
        assert_eq!(controller.service().watchdog, WatchdogCheck::Latched);
    }

    #[test]
    fn test_deferred_reversal_finished_by_service() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let config = ControllerConfig {
            reversal_policy: ReversalPolicy::Deferred,
            ..Default::default()
        };
        let mut controller = rig.controller(config, &encoder);

        send(&mut controller, "C:50,90\n");
        let outcomes = send(&mut controller, "C:-50,90\n");
        assert_eq!(
            outcomes,
            [LineOutcome::Drive {
                speed: -50,
                steer: 90,
                motor: Some(SpeedChange::Deferred),
            }]
        );
        assert_eq!(controller.snapshot().direction, Direction::Stopped);

        rig.clock.advance(29);
        assert!(!controller.service().reversal_completed);
        rig.clock.advance(1);
        assert!(controller.service().reversal_completed);
        assert_eq!(controller.snapshot().direction, Direction::Backward);
        assert!(rig.delay.holds().is_empty());
    }

    #[test]
    fn test_status_cadence() {
        let rig = Rig::new();
        let encoder = QuadratureDecoder::new();
        let mut controller = rig.controller(ControllerConfig::default(), &encoder);

        let mut lines = 0;
        for _ in 0..100 {
            send(&mut controller, "C:0,90\n");
            rig.clock.advance(1);
            lines += controller.service().status.is_some() as usize;
        }
        assert_eq!(lines, 5);
    }

    proptest! {
        #[test]
        fn arbitrary_input_keeps_state_in_range(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let rig = Rig::new();
            let encoder = QuadratureDecoder::new();
            let mut controller = rig.controller(ControllerConfig::default(), &encoder);

            for byte in bytes {
                controller.receive_byte(byte).unwrap();
                let snap = controller.snapshot();
                prop_assert!((-100..=100).contains(&snap.speed));
                prop_assert!(snap.steer <= 180);
                prop_assert_eq!(snap.direction, Direction::from_speed(snap.speed as i32));
            }
        }
    }
}
