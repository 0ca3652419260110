//! Display model implementations for table output

mod common;
mod media;

pub use media::MediaDisplay;
