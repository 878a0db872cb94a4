// src/core/mod.rs

pub mod html;
pub mod net;
pub mod sanitize;
pub mod throttle;

pub use net::{Client, HttpGet};
pub use throttle::Throttle;
