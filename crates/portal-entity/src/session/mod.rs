//! Session domain entities.

pub mod device;
pub mod model;

pub use device::{DeviceMeta, classify_user_agent};
pub use model::Session;
