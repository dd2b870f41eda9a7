pub mod error;
pub mod models;
pub mod services;

pub use error::{NexusError, Result};
