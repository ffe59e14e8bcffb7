//! Error types for the gateway crate

use thiserror::Error;
use trader_core::ServiceKind;

/// Gateway-level errors (registry administration)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Record '{name}' declares kind {declared} but the handle is {actual}")]
    KindMismatch {
        name: String,
        declared: ServiceKind,
        actual: ServiceKind,
    },

    #[error("Service '{0}' is already published")]
    AlreadyPublished(String),
}
