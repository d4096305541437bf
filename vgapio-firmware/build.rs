//! Build script for vgapio-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates display.toml at compile time
//! - Generates the display configuration the firmware is built with

use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use vgapio_core::generator::InstructionBudget;
use vgapio_core::timing::{AxisTiming, TimingMismatch, VideoTiming, SYS_CLK_HZ};

/// Pin keys, in the order `VgaPins::new` takes them
const PIN_KEYS: [&str; 6] = ["vsync", "hsync", "red", "green", "blue", "pclk"];

/// Highest user GPIO on the RP2040
const MAX_GPIO: i64 = 29;

fn main() {
    setup_linker();
    let (pins, timing) = validate_config();
    generate_config(&pins, &timing);
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

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate display.toml, returning the pin map and the video mode
fn validate_config() -> (BTreeMap<&'static str, u8>, VideoTiming) {
    println!("cargo:rerun-if-changed=display.toml");

    let config_path = Path::new("display.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: display.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a display.toml configuration file.        ║\n\
            ║  Please create one in the vgapio-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read display.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in display.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    validate_required_sections(&config);
    let pins = validate_pins(&config);
    let timing = validate_timing(&config);

    println!("cargo:warning=display.toml validated successfully");
    (pins, timing)
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

/// Panic with a boxed list of errors, if there are any
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let mut errors = Vec::new();

    if config.get("pins").and_then(|p| p.as_table()).is_none() {
        errors.push("Missing [pins] section".to_string());
    }

    match config.get("timing") {
        Some(toml::Value::Table(timing)) => {
            for axis in ["horizontal", "vertical"] {
                if timing.get(axis).and_then(|a| a.as_table()).is_none() {
                    errors.push(format!("Missing [timing.{}] section", axis));
                }
            }
        }
        _ => errors.push("Missing [timing] section".to_string()),
    }

    report("Missing required sections in display.toml", &errors);
}

/// Validate pin numbers: in range, unique, colour pins consecutive
fn validate_pins(config: &toml::Value) -> BTreeMap<&'static str, u8> {
    let table = config.get("pins").and_then(|p| p.as_table()).unwrap();

    let mut errors = Vec::new();
    let mut pins = BTreeMap::new();

    for key in PIN_KEYS {
        match table.get(key) {
            Some(toml::Value::Integer(pin)) if (0..=MAX_GPIO).contains(pin) => {
                pins.insert(key, *pin as u8);
            }
            Some(toml::Value::Integer(_)) => {
                errors.push(format!("[pins] {} must be 0-{}", key, MAX_GPIO));
            }
            Some(_) => errors.push(format!("[pins] {} must be an integer", key)),
            None => errors.push(format!("[pins] missing '{}'", key)),
        }
    }

    for (key, pin) in &pins {
        for (other, other_pin) in &pins {
            if key < other && pin == other_pin {
                errors.push(format!("[pins] {} and {} both use GPIO{}", key, other, pin));
            }
        }
    }

    // `out pins, 3` drives consecutive GPIOs starting at bit 0
    let rgb_order = env::var_os("CARGO_FEATURE_RGB_ORDER").is_some();
    let order = if rgb_order {
        ["red", "green", "blue"]
    } else {
        ["blue", "green", "red"]
    };
    if let (Some(&b0), Some(&b1), Some(&b2)) =
        (pins.get(order[0]), pins.get(order[1]), pins.get(order[2]))
    {
        if b1 != b0 + 1 || b2 != b0 + 2 {
            errors.push(format!(
                "[pins] {}, {}, {} must be consecutive GPIOs",
                order[0], order[1], order[2]
            ));
        }
    }

    report("Invalid pin configuration", &errors);
    pins
}

fn axis(timing: &toml::Table, name: &str, errors: &mut Vec<String>) -> AxisTiming {
    let table = timing.get(name).and_then(|a| a.as_table()).unwrap();

    let mut field = |key: &str| -> u32 {
        match table.get(key) {
            Some(toml::Value::Integer(v)) if (0..=u16::MAX as i64).contains(v) => *v as u32,
            Some(_) => {
                errors.push(format!("[timing.{}] {} must be 0-{}", name, key, u16::MAX));
                0
            }
            None => {
                errors.push(format!("[timing.{}] missing '{}'", name, key));
                0
            }
        }
    };

    AxisTiming::new(
        field("active"),
        field("front_porch"),
        field("sync_pulse"),
        field("back_porch"),
    )
}

/// Validate the video mode against the framebuffer and the generator programs
fn validate_timing(config: &toml::Value) -> VideoTiming {
    let table = config.get("timing").and_then(|t| t.as_table()).unwrap();

    let mut errors = Vec::new();

    let horizontal = axis(table, "horizontal", &mut errors);
    let vertical = axis(table, "vertical", &mut errors);
    let pixel_clock_hz = match table.get("pixel_clock_hz") {
        Some(toml::Value::Integer(hz)) if *hz > 0 && *hz <= SYS_CLK_HZ as i64 / 10 => *hz as u32,
        Some(_) => {
            errors.push(format!(
                "[timing] pixel_clock_hz must be 1-{}",
                SYS_CLK_HZ / 10
            ));
            0
        }
        None => {
            errors.push("[timing] missing 'pixel_clock_hz'".to_string());
            0
        }
    };
    report("Invalid timing configuration", &errors);

    let timing = VideoTiming::new(horizontal, vertical, pixel_clock_hz);

    if !timing.matches_framebuffer() {
        errors.push(format!(
            "active area {}x{} does not match the 320x240 framebuffer",
            timing.width(),
            timing.height()
        ));
    }

    if let Err(mismatch) = timing.check_generators() {
        errors.push(describe_mismatch(mismatch));
    }

    if let Err(e) = InstructionBudget::check(&InstructionBudget::builtin_footprint()) {
        errors.push(e.to_string());
    }

    report("Timing not supported by the generators", &errors);

    let dividers = timing.dividers(SYS_CLK_HZ);
    for (name, div) in [
        ("sync", dividers.sync),
        ("colour", dividers.color),
        ("pixel clock", dividers.pixel_clock),
    ] {
        if div.frac != 0 {
            println!(
                "cargo:warning={} clock divider {}+{}/256 is fractional; expect jitter",
                name, div.int, div.frac
            );
        }
    }

    timing
}

fn describe_mismatch(mismatch: TimingMismatch) -> String {
    match mismatch {
        TimingMismatch::HorizontalSyncPulse { expected, actual } => {
            format!("horizontal sync_pulse is {}, must be {}", actual, expected)
        }
        TimingMismatch::HorizontalBackPorch { expected, actual } => {
            format!("horizontal back_porch is {}, must be {}", actual, expected)
        }
        TimingMismatch::VerticalFrontPorch { expected, actual } => {
            format!("vertical front_porch is {}, must be {}", actual, expected)
        }
        TimingMismatch::VerticalSyncPulse { expected, actual } => {
            format!("vertical sync_pulse is {}, must be {}", actual, expected)
        }
        TimingMismatch::VerticalBackPorch { expected, actual } => {
            format!("vertical back_porch is {}, must be {}", actual, expected)
        }
        TimingMismatch::HorizontalTooShort => {
            "horizontal active + front_porch too short".to_string()
        }
        TimingMismatch::EmptyActiveArea => "active area is empty".to_string(),
    }
}

/// Write display_config.rs into OUT_DIR
fn generate_config(pins: &BTreeMap<&'static str, u8>, timing: &VideoTiming) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let h = &timing.horizontal;
    let v = &timing.vertical;

    let pin_args = PIN_KEYS
        .iter()
        .map(|key| format!("$p.PIN_{}", pins[key]))
        .collect::<Vec<_>>()
        .join(", ");

    let code = format!(
        "// Generated by build.rs from display.toml\n\
        \n\
        /// Video mode from display.toml\n\
        pub const DISPLAY_TIMING: vgapio_core::VideoTiming = vgapio_core::VideoTiming::new(\n    \
            vgapio_core::timing::AxisTiming::new({}, {}, {}, {}),\n    \
            vgapio_core::timing::AxisTiming::new({}, {}, {}, {}),\n    \
            {},\n\
        );\n\
        \n\
        /// Claim the display pins from display.toml\n\
        macro_rules! vga_pins {{\n    \
            ($common:expr, $p:ident) => {{\n        \
                vgapio_hal_rp2040::VgaPins::new($common, {})\n    \
            }};\n\
        }}\n",
        h.active,
        h.front_porch,
        h.sync_pulse,
        h.back_porch,
        v.active,
        v.front_porch,
        v.sync_pulse,
        v.back_porch,
        timing.pixel_clock_hz,
        pin_args,
    );

    fs::write(out_dir.join("display_config.rs"), code).unwrap();
}
