//! Terminal map of glacier melt risk.
//!
//! A glacier collection is fetched once, each glacier with a position
//! becomes a braille marker colored by its risk classification, and
//! selecting a marker shows the glacier's details next to the map.

pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod detail;
pub mod diagnostics;
pub mod glacier;
pub mod loader;
pub mod map;
pub mod ui;
