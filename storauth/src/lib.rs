#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

// Re-export core types
pub use storauth_core::*;

#[cfg(feature = "azure")]
pub mod azure;

#[cfg(feature = "retry")]
pub mod retry;
