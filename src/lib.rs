//! Tick-driven trading decision engine.
//!
//! Each incoming [`model::tick::Tick`] flows through the indicator engine, the
//! pattern tracker, and the decision engine, then drives a single-position
//! lifecycle with cooldown, loss-streak suspension, and ordered exit rules.
//! [`engine::TickEngine`] owns the whole pipeline for one instrument.

pub mod clock;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod lifecycle;
pub mod model;
pub mod params_store;
pub mod pattern;
pub mod priming;
pub mod replay;
pub mod sink;
