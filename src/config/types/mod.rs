//! Configuration utility types.
//!
//! | Module  | Purpose                               |
//! |---------|---------------------------------------|
//! | `error` | `ConfigError` and grouped diagnostics |
//! | `field` | Field paths labeling diagnostics      |

mod error;
mod field;

pub use error::{ConfigDiagnostics, ConfigError};
pub use field::FieldPath;
