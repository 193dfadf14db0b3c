//! Isobattle - isometric tile-slope terrain and projectile ballistics

pub mod core;
pub mod math;
pub mod terrain;
pub mod physics;
pub mod config;
