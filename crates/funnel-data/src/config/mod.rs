//! Configuration for loading and drawing funnels

pub mod null_handling;
pub mod settings;

pub use null_handling::*;
pub use settings::*;
