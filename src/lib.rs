//! Meteo Dashboard - periodic CSV chart refresher for the weather station
//!
//! This library exposes the core modules for testing and reuse.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod query;
pub mod render;
pub mod updater;
