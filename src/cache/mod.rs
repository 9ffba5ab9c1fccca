//! Cache module for memoizing computed views
//!
//! The pipeline is a pure function of its inputs, so the last computed
//! `WeatherViews` can be reused whenever the same payloads, options and local
//! date come in again. Nothing is persisted; the cache lives as long as its
//! owner.

mod manager;

pub use manager::{CachedViews, ViewCache};
