//! fxload Common Library
//!
//! Shared error handling and logging bootstrap for the fxload workspace.
//!
//! # Example
//!
//! ```no_run
//! use fxload_common::{ImportError, Result};
//!
//! fn table_for(file_name: &str) -> Result<String> {
//!     file_name
//!         .strip_suffix(".zip")
//!         .map(str::to_owned)
//!         .ok_or_else(|| ImportError::MalformedFilename(file_name.to_string()))
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{ImportError, Result};
