//! Cell binning and tower calibration for sampling calorimeters.
//!
//! Energy deposits from simulated particle steps are apportioned across the
//! cells of a layer's bin grid according to the length of path lying in each
//! cell, turned into raw towers, optionally digitized, and finally calibrated
//! and zero-suppressed.

mod exports;
pub use exports::*;

pub mod error;
pub mod types;
pub mod index;
pub mod frame;
pub mod deposit;
pub mod cell;
pub mod binner;
pub mod tower;
pub mod digitize;
pub mod calibrate;
pub mod conservation;
pub mod config;
pub mod pipeline;
pub mod io;
pub mod utils;
