//! Build-time display configuration
//!
//! Generated by build.rs from display.toml: the video mode as
//! `DISPLAY_TIMING` and the `vga_pins!` macro that claims the configured
//! GPIOs.

include!(concat!(env!("OUT_DIR"), "/display_config.rs"));
