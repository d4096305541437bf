//! Embassy async tasks

pub mod pattern;

pub use pattern::pattern_task;
