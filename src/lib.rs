//! Track wireless clients reported by a CMX location service.
//!
//! A [`tracker::Tracker`] detects the service's schema once, normalizes lookup
//! responses into [`record::ClientRecord`]s, keeps them on the flagged or
//! quarantined [`watchlist`] and marks each on its floor plan.

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod normalize;
pub mod record;
pub mod render;
pub mod schema;
pub mod service;
pub mod session;
pub mod survey;
pub mod tracker;
pub mod watchlist;
