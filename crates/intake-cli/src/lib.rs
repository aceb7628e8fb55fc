//! CLI library components for Intake Desk.

pub mod logging;
