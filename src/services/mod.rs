//! Business logic services

pub mod geo;
pub mod hos;
pub mod routing;
