//! Type definitions for wgled

pub mod association;
pub mod error;
pub mod ids;

pub use association::Association;
pub use error::{Error, Result};
pub use ids::{ProductId, TagId};
