//! Build script for helmsman-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates controller.toml at compile time
//! - Generates `config_gen.rs` with the validated values as constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values pulled out of controller.toml
struct Settings {
    baud: i64,
    watchdog_timeout_ms: i64,
    status_interval_ms: i64,
    reversal_settle_ms: i64,
    stall_check_interval_ms: i64,
    max_duty_percent: i64,
    pwm_frequency_hz: i64,
    phase_inverted: bool,
    reversal: String,
    min_pulse_us: i64,
    max_pulse_us: i64,
    stall_policy: String,
    report_overflow: bool,
}

/// Validate controller.toml configuration at compile time
fn validate_config() -> Settings {
    // Re-run if controller.toml changes
    println!("cargo:rerun-if-changed=controller.toml");

    let config_path = Path::new("controller.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: controller.toml not found!                               ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a controller.toml configuration file.     ║\n\
            ║  Please create one in the helmsman-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read controller.toml                           ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in controller.toml                   ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let settings = Settings {
        baud: integer(&config, "link", "baud", 9_600, 1_000_000, &mut errors),
        watchdog_timeout_ms: integer(&config, "timing", "watchdog_timeout_ms", 1, 60_000, &mut errors),
        status_interval_ms: integer(&config, "timing", "status_interval_ms", 1, 10_000, &mut errors),
        reversal_settle_ms: integer(&config, "timing", "reversal_settle_ms", 0, 1_000, &mut errors),
        stall_check_interval_ms: integer(
            &config,
            "timing",
            "stall_check_interval_ms",
            1,
            60_000,
            &mut errors,
        ),
        max_duty_percent: integer(&config, "motor", "max_duty_percent", 1, 100, &mut errors),
        pwm_frequency_hz: integer(&config, "motor", "pwm_frequency_hz", 200, 50_000, &mut errors),
        phase_inverted: boolean(&config, "motor", "phase_inverted", &mut errors),
        reversal: choice(&config, "motor", "reversal", &["blocking", "deferred"], &mut errors),
        min_pulse_us: integer(&config, "steering", "min_pulse_us", 100, 3_000, &mut errors),
        max_pulse_us: integer(&config, "steering", "max_pulse_us", 100, 3_000, &mut errors),
        stall_policy: choice(
            &config,
            "safety",
            "stall_policy",
            &["ignore", "report", "stop"],
            &mut errors,
        ),
        report_overflow: boolean(&config, "safety", "report_overflow", &mut errors),
    };

    if settings.min_pulse_us >= settings.max_pulse_us {
        errors.push("[steering] min_pulse_us must be below max_pulse_us".to_string());
    }

    if settings.watchdog_timeout_ms <= settings.reversal_settle_ms {
        errors.push("[timing] watchdog_timeout_ms must exceed reversal_settle_ms".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid controller configuration                         ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=controller.toml validated successfully");
    settings
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn lookup<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    config.get(section).and_then(|s| s.get(key))
}

/// Required integer within `min..=max`
fn integer(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> i64 {
    match lookup(config, section, key) {
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => *v,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            min
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            min
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            min
        }
    }
}

/// Required boolean
fn boolean(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> bool {
    match lookup(config, section, key) {
        Some(toml::Value::Boolean(v)) => *v,
        Some(_) => {
            errors.push(format!("[{}] {} must be true or false", section, key));
            false
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            false
        }
    }
}

/// Required string from a fixed set
fn choice(
    config: &toml::Value,
    section: &str,
    key: &str,
    allowed: &[&str],
    errors: &mut Vec<String>,
) -> String {
    match lookup(config, section, key) {
        Some(toml::Value::String(v)) if allowed.contains(&v.as_str()) => v.clone(),
        Some(_) => {
            errors.push(format!(
                "[{}] {} must be one of: {}",
                section,
                key,
                allowed.join(", ")
            ));
            allowed[0].to_string()
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            allowed[0].to_string()
        }
    }
}

/// Write the validated values as Rust constants
fn generate_config(s: &Settings) {
    let reversal = match s.reversal.as_str() {
        "deferred" => "ReversalPolicy::Deferred",
        _ => "ReversalPolicy::Blocking",
    };
    let stall = match s.stall_policy.as_str() {
        "ignore" => "StallPolicy::Ignore",
        "stop" => "StallPolicy::Stop",
        _ => "StallPolicy::Report",
    };

    let code = format!(
        "// Generated by build.rs from controller.toml. Do not edit.\n\
         pub const BAUD_RATE: u32 = {};\n\
         pub const WATCHDOG_TIMEOUT_MS: u32 = {};\n\
         pub const STATUS_INTERVAL_MS: u32 = {};\n\
         pub const REVERSAL_SETTLE_MS: u32 = {};\n\
         pub const STALL_CHECK_INTERVAL_MS: u32 = {};\n\
         pub const MAX_DUTY_PERCENT: u8 = {};\n\
         pub const MOTOR_PWM_HZ: u32 = {};\n\
         pub const PHASE_INVERTED: bool = {};\n\
         pub const REVERSAL_POLICY: ReversalPolicy = {};\n\
         pub const SERVO_MIN_PULSE_US: u16 = {};\n\
         pub const SERVO_MAX_PULSE_US: u16 = {};\n\
         pub const STALL_POLICY: StallPolicy = {};\n\
         pub const REPORT_OVERFLOW: bool = {};\n",
        s.baud,
        s.watchdog_timeout_ms,
        s.status_interval_ms,
        s.reversal_settle_ms,
        s.stall_check_interval_ms,
        s.max_duty_percent,
        s.pwm_frequency_hz,
        s.phase_inverted,
        reversal,
        s.min_pulse_us,
        s.max_pulse_us,
        stall,
        s.report_overflow,
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("config_gen.rs"), code).unwrap();
}
