//! wxview library
//!
//! Reduces weather provider payloads (a 3-hourly forecast series, an optional
//! current-weather snapshot and an optional air-quality reading) into the view
//! models a weather dashboard renders: an hourly projection, a daily
//! aggregation and a current-conditions panel with derived comfort metrics.
//! The `outfit` module adds optional AI clothing suggestions on top.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod forecast;
pub mod logging;
pub mod metrics;
pub mod outfit;
