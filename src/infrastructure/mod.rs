//! Infrastructure layer: I/O implementations and DI container
//!
//! Real implementations of the store, HTTP, navigation and display traits,
//! plus the container that wires them into services.

pub mod di;
pub mod error;
pub mod traits;

pub use di::ServiceContainer;
pub use error::{InfraError, InfraResult};
