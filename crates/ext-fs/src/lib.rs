//! Filesystem primitives for the extension manager.
//!
//! Provides atomic writes, advisory file locks, and confined relative path
//! checks used by the state store and archive ingestion.

pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use io::{FileLock, write_atomic};
pub use path::is_confined_relative;
