//! Type definitions

pub mod messages;
pub mod trip;

pub use messages::*;
pub use trip::*;
