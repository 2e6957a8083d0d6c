//! limcheck Core
//!
//! Core types shared by the macro extractor and the constant comparator.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CheckConfig, CompilerCommand};
pub use error::{Error, Result};
pub use types::*;
