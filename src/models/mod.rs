//! Display models for CLI output
//!
//! Converts normalized media items into table-friendly rows.

pub mod display;

pub use display::MediaDisplay;
