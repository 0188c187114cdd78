//! Construction-time validation errors
//!
//! Data problems never raise: missing inputs degrade to neutral values per
//! component contract. The only error path is misuse of a public constructor
//! with an impossible configuration, which fails fast here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),

    #[error("window configuration invalid: {0}")]
    Window(&'static str),
}
